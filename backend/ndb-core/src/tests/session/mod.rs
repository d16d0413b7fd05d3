mod command;
mod dispatch;
mod repl;
mod shutdown;
mod state;
