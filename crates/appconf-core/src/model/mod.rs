mod definition;
mod reference;
mod resource;
mod status;
mod workload;

pub use definition::TraitTypeDescriptor;
pub use reference::Reference;
pub use resource::Resource;
pub use status::{find_status, WorkloadScope, WorkloadStatus};
pub use workload::{Managed, Workload};
