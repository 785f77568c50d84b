mod reference;

pub use reference::new_transaction_reference;
