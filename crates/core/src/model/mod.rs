mod favorite;
mod ids;
mod word;

pub use favorite::{FavoriteList, FavoriteListError, NewFavoriteList};
pub use ids::{FavoriteListId, ParseIdError, UserId};
pub use word::{Answer, WordRecord};
