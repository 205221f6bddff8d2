use slotmap::new_key_type;

new_key_type! {
    /// Key of a structure object loaded into a [`Session`](crate::engine::session::Session).
    pub struct ObjectId;
}
