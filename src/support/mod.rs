//! Support tickets raised by labels and the replies exchanged on them.

mod models;
mod schema;
mod store;

pub use models::{
    status_rank, Reply, Ticket, TicketWithReplies, SENDER_ADMIN, SENDER_USER, STATUS_FILTER_ALL,
};
pub use store::{SqliteSupportStore, SupportStore};
