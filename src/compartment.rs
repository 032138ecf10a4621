//! Nested spatial compartments.
//!
//! A compartment is a named 2D surface or 3D volume that may sit inside another
//! one. The link to the parent is non-owning, so dropping a parent leaves its
//! children without one. Parents never learn about their children.

use std::{
    cell::RefCell,
    fmt,
    rc::{Rc, Weak},
};

use crate::{Float, error::Error};

/// A named spatial region with an optional enclosing compartment.
#[derive(Debug)]
pub struct Compartment {
    id: String,
    spatial_dimensions: i32,
    size: Float,
    parent: RefCell<Weak<Compartment>>,
}

impl Compartment {
    /// Create a compartment, optionally placed inside `parent`.
    ///
    /// Dimensions other than 2 or 3 and non-positive sizes are kept as given and
    /// only logged as warnings.
    pub fn new(
        id: impl Into<String>,
        spatial_dimensions: i32,
        size: Float,
        parent: Option<&Rc<Compartment>>,
    ) -> Rc<Self> {
        let id = id.into();
        if spatial_dimensions != 2 && spatial_dimensions != 3 {
            log::warn!(
                "compartment '{id}' has unusual spatial dimensions: {spatial_dimensions} (expected 2 or 3)"
            );
        }
        if !(size > 0.0) {
            log::warn!("compartment '{id}' has non-positive size: {size}");
        }
        Rc::new(Self {
            id,
            spatial_dimensions,
            size,
            parent: RefCell::new(parent.map(Rc::downgrade).unwrap_or_default()),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// 2 for a surface, 3 for a volume.
    pub fn spatial_dimensions(&self) -> i32 {
        self.spatial_dimensions
    }

    /// Area or volume.
    pub fn size(&self) -> Float {
        self.size
    }

    /// Same as [`size`](Self::size).
    pub fn volume(&self) -> Float {
        self.size
    }

    /// The enclosing compartment, if it is set and still alive.
    pub fn parent(&self) -> Option<Rc<Compartment>> {
        self.parent.borrow().upgrade()
    }

    /// Move this compartment inside `parent`, or detach it with `None`.
    ///
    /// Fails with [`Error::CompartmentCycle`] if `parent` is this compartment or
    /// already lies inside it; the old parent is kept in that case.
    pub fn set_parent(&self, parent: Option<&Rc<Compartment>>) -> Result<(), Error> {
        if let Some(p) = parent {
            if p.is_inside(Some(self)) {
                return Err(Error::CompartmentCycle {
                    child: self.id.clone(),
                    parent: p.id.clone(),
                });
            }
        }
        *self.parent.borrow_mut() = parent.map(Rc::downgrade).unwrap_or_default();
        Ok(())
    }

    /// `true` if `other` is this compartment or one of its ancestors.
    pub fn is_inside(&self, other: Option<&Compartment>) -> bool {
        let Some(other) = other else {
            return false;
        };
        std::ptr::eq(self, other) || self.ancestors().any(|a| std::ptr::eq(&*a, other))
    }

    /// Enclosing compartments, innermost first.
    pub fn ancestors(&self) -> Ancestors {
        Ancestors { next: self.parent() }
    }

    /// Number of ancestors; 0 for a top-level compartment.
    pub fn depth(&self) -> usize {
        self.ancestors().count()
    }

    /// One-line summary, e.g. `Compartment 'cyto': 3D, size=1, parent=cell`.
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Compartment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Compartment '{}': {}D, size={}",
            self.id, self.spatial_dimensions, self.size
        )?;
        if let Some(parent) = self.parent() {
            write!(f, ", parent={}", parent.id)?;
        }
        Ok(())
    }
}

/// Iterator over the enclosing compartments, see [`Compartment::ancestors`].
pub struct Ancestors {
    next: Option<Rc<Compartment>>,
}

impl Iterator for Ancestors {
    type Item = Rc<Compartment>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = current.parent();
        Some(current)
    }
}
