mod alias;
pub use alias::*;

mod options;
pub use options::*;

mod page;
pub use page::*;
