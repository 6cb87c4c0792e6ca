use std::fmt;
use std::sync::Arc;

use crate::component::Component;

/// A component drawn `multiplicity` times from the same rail.
///
/// The component itself is shared; several supplies or budgets may hold the
/// same `Arc<Component>`.
#[derive(Clone, Debug)]
pub struct Load {
    component: Arc<Component>,
    multiplicity: u32,
}

impl Load {
    pub fn new(component: impl Into<Arc<Component>>, multiplicity: u32) -> Self {
        Self {
            component: component.into(),
            multiplicity,
        }
    }

    pub fn component(&self) -> &Arc<Component> {
        &self.component
    }

    pub fn multiplicity(&self) -> u32 {
        self.multiplicity
    }

    pub(crate) fn set_multiplicity(&mut self, multiplicity: u32) {
        self.multiplicity = multiplicity;
    }
}

impl fmt::Display for Load {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (x{})", self.component, self.multiplicity)
    }
}

/// Sum of multiplicities over `loads`.
pub(crate) fn count(loads: &[Load]) -> u64 {
    loads.iter().map(|load| u64::from(load.multiplicity)).sum()
}
