pub mod event;
pub mod pagination;
pub mod user;

pub use event::{Event, EventPatch, EventStatus, NewEvent};
pub use pagination::{Paginated, Pagination};
pub use user::{Credentials, User};
