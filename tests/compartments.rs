use stiff_session::{Compartment, Error};

#[test]
fn nested_compartments() {
    let extracellular = Compartment::new("extracellular", 3, 1000.0, None);
    let membrane = Compartment::new("membrane", 2, 50.0, Some(&extracellular));
    let cytosol = Compartment::new("cytosol", 3, 10.0, Some(&membrane));
    let nucleus = Compartment::new("nucleus", 3, 1.0, Some(&cytosol));

    assert!(nucleus.is_inside(Some(&*extracellular)));
    assert!(nucleus.is_inside(Some(&*membrane)));
    assert!(!membrane.is_inside(Some(&*nucleus)));
    assert!(!nucleus.is_inside(None));
    assert_eq!(nucleus.depth(), 3);
    assert_eq!(extracellular.depth(), 0);
    assert_eq!(
        membrane.describe(),
        "Compartment 'membrane': 2D, size=50, parent=extracellular"
    );

    // The outermost compartment cannot move inside its own descendant
    let err = extracellular.set_parent(Some(&nucleus)).unwrap_err();
    assert_eq!(
        err,
        Error::CompartmentCycle {
            child: "extracellular".into(),
            parent: "nucleus".into(),
        }
    );
    assert!(extracellular.parent().is_none());

    // Moving the nucleus out keeps the rest of the chain
    nucleus.set_parent(Some(&membrane)).unwrap();
    assert_eq!(nucleus.depth(), 2);
    assert!(!nucleus.is_inside(Some(&*cytosol)));
}

#[test]
fn dropped_parent_detaches_children() {
    let child;
    {
        let parent = Compartment::new("cell", 3, 1.0, None);
        child = Compartment::new("organelle", 3, 0.1, Some(&parent));
        assert!(child.parent().is_some());
    }
    assert!(child.parent().is_none());
    assert_eq!(child.to_string(), "Compartment 'organelle': 3D, size=0.1");
}
