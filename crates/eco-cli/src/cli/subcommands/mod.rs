mod user;

pub use user::{UserCommands, UserLogoutArgs, UserRegisterArgs, UserSetArgs};
