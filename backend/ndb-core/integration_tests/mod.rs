mod discovery;
mod error;
mod helpers;
mod session;
