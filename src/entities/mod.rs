mod title;

pub use title::{DetailsUpdate, NewTitle, TitleKind, TitleOrder, TitleRecord};
