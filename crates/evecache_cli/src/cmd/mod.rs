/// Key/value decode command.
pub mod decode;
/// Structure dump command.
pub mod dump;
/// Raw hex view command.
pub mod hex;
/// Framing information command.
pub mod info;
/// Value tree printing.
pub mod print;
/// Directory batch decode command.
pub mod scan;
/// Shared output helpers.
pub mod util;
