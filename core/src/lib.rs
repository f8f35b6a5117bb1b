pub mod config;
mod error;
mod incremental;
mod parser;
mod repeated;
mod reply;
mod session;
mod state;
mod step;
pub mod traits;

#[cfg(any(feature = "tokio", feature = "futures"))]
pub mod async_stream;

pub use config::SessionConfig;
pub use error::Error;
pub use incremental::Incremental;
pub use parser::{
    Parser, any, defer, element, elements, eof, fail, many, many1, pure, satisfy, sep_by,
    skip_many,
};
pub use repeated::{
    ResultStream, StreamCell, StreamIter, many_stream, run_many, run_many_state, run_many_stream,
};
pub use reply::Reply;
pub use session::{
    Session, parse_inc, parse_inc_state, parse_inc_state_with, run_inc, run_inc_state,
    run_inc_state_with,
};
pub use state::{RepeatInput, SliceInput, State};
pub use step::{Control, Request, Resume, Step, Thunk};
pub use traits::{Advance, Boundary, Input, ParserState};
