use crate::error::StoreError;
use crate::model::{Message, NewMessage};

/// Persistence seam for the pipeline. The SQLite implementation lives in
/// parley-db; tests use an in-memory double.
///
/// `insert` and `update` are the two halves of the store's save
/// operation: insert hands out the store-assigned id, update rewrites an
/// existing row by id.
pub trait MessageStore: Send + Sync {
    fn insert(&self, message: NewMessage) -> Result<Message, StoreError>;

    fn update(&self, message: &Message) -> Result<Message, StoreError>;

    fn find_by_id(&self, id: i64) -> Result<Option<Message>, StoreError>;

    fn find_by_receiver(&self, receiver_id: i64) -> Result<Vec<Message>, StoreError>;
}
