//! Application services - the rules behind each endpoint, written against ports.

mod account;

pub use account::{
    ACCOUNT_DELETED, AccountService, AccountUpdate, AccountUpdated, FavoriteAdded, FavoriteRemoved,
    FavoriteTarget, UpdateAccountCommand,
};
