use super::{Reference, Resource};

/// A workload together with the traits and scopes desired for it
#[derive(Debug, Clone, PartialEq)]
pub struct Workload {
    pub workload: Resource,
    /// Applied in order, after the workload itself
    pub traits: Vec<Resource>,
    /// Desired scope memberships
    pub scopes: Vec<Resource>,
}

impl Workload {
    pub fn new(workload: Resource) -> Self {
        Self {
            workload,
            traits: Vec::new(),
            scopes: Vec::new(),
        }
    }

    pub fn with_trait(mut self, body: Resource) -> Self {
        self.traits.push(body);
        self
    }

    pub fn with_scope(mut self, scope: Resource) -> Self {
        self.scopes.push(scope);
        self
    }

    pub fn reference(&self) -> Reference {
        self.workload.reference()
    }
}

/// Role of a resource handed to the store
///
/// Decided once when the engine builds the call, so store implementations
/// and test doubles never need to guess from `kind`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Managed<'a> {
    Workload(&'a Resource),
    Trait(&'a Resource),
    Scope(&'a Resource),
}

impl<'a> Managed<'a> {
    pub fn resource(&self) -> &'a Resource {
        match self {
            Managed::Workload(r) | Managed::Trait(r) | Managed::Scope(r) => r,
        }
    }

    pub fn role(&self) -> &'static str {
        match self {
            Managed::Workload(_) => "workload",
            Managed::Trait(_) => "trait",
            Managed::Scope(_) => "scope",
        }
    }
}
