//! Permission assignment rows and the subject abstraction.

pub mod model;
pub mod subject;

pub use model::{Approval, AssignmentRow, GroupAssignmentRow};
pub use subject::{Subject, SubjectKind};
