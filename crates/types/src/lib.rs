pub mod alphabet;
pub mod ids;
pub mod lexicon;
pub mod warnings;

pub use ids::EntryId;
pub use lexicon::{
    Citation, CrossRefDecl, Deconstruction, Entry, GrammarForm, GrammarInfo, RelationKind, Sense,
};
pub use warnings::{Stage, Warning, WarningKind};
