use crate::models::Food;

/// A change to one record of the remote collection.
///
/// Every carried [`Food`] has its id set from the record key.
#[derive(Debug, Clone, PartialEq)]
pub enum ChildEvent {
    Added(Food),
    Changed(Food),
    Removed(Food),
    Moved(Food),
    /// Terminal: the subscription was revoked and delivers nothing further.
    Cancelled(String),
}

impl ChildEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            ChildEvent::Added(_) => "added",
            ChildEvent::Changed(_) => "changed",
            ChildEvent::Removed(_) => "removed",
            ChildEvent::Moved(_) => "moved",
            ChildEvent::Cancelled(_) => "cancelled",
        }
    }

    pub fn food(&self) -> Option<&Food> {
        match self {
            ChildEvent::Added(food)
            | ChildEvent::Changed(food)
            | ChildEvent::Removed(food)
            | ChildEvent::Moved(food) => Some(food),
            ChildEvent::Cancelled(_) => None,
        }
    }
}
