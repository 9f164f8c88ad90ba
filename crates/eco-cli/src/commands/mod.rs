pub mod account;
pub mod ask;
pub mod dispatch;
pub mod lang;
pub mod pickup;
mod prompt;
pub mod recyclers;
pub mod result;
mod run;
pub mod scan;
pub mod shell;
pub mod user;
pub mod voice;
