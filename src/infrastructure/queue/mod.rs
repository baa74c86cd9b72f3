mod in_memory_queue;
mod pg_message_queue;
mod queue_factory;

pub use in_memory_queue::InMemoryMessageQueue;
pub use pg_message_queue::PgMessageQueue;
pub use queue_factory::MessageQueueFactory;
