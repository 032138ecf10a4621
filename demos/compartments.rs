//! # Example: Compartment hierarchy
//!
//! Build a cell's compartments and query containment.

use stiff_session::prelude::*;

fn main() {
    let extracellular = Compartment::new("extracellular", 3, 1000.0, None);
    let membrane = Compartment::new("membrane", 2, 50.0, Some(&extracellular));
    let cytosol = Compartment::new("cytosol", 3, 10.0, Some(&membrane));
    let nucleus = Compartment::new("nucleus", 3, 1.0, Some(&cytosol));

    for c in [&extracellular, &membrane, &cytosol, &nucleus] {
        println!("{c} (depth {})", c.depth());
    }

    let ancestors: Vec<String> = nucleus.ancestors().map(|a| a.id().to_string()).collect();
    println!("nucleus is inside: {}", ancestors.join(" < "));

    println!(
        "cytosol inside nucleus? {}",
        cytosol.is_inside(Some(&*nucleus))
    );

    match extracellular.set_parent(Some(&nucleus)) {
        Ok(()) => println!("unexpectedly re-parented"),
        Err(e) => println!("rejected: {e}"),
    }

    // Anomalous values are kept, with a warning in the log
    let odd = Compartment::new("odd", 1, 0.0, None);
    println!("{odd}");
}
