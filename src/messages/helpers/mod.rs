mod encryption;
mod receive;

pub(crate) use encryption::*;
pub(crate) use receive::*;
