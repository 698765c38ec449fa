//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Request Format
//! ```text
//! <operation>\n
//! <arg 1>\n
//! ...
//! <arg N>\n
//! ```
//! N is fixed per operation (see [`CommandType::arg_count`]). Every line is
//! trimmed of surrounding whitespace on receipt, so CRLF clients work too.
//!
//! ### Response Format
//! ```text
//! <text>\n
//! ```
//! The server closes the connection after the response, so the client reads
//! to EOF. Report responses are multi-line; every line already ends in `\n`.

use std::io::{BufRead, Read, Write};

use crate::error::{DbError, Result};
use super::{Command, CommandType, Response};

/// Maximum length of a single request line, newline included (64 KB)
pub const MAX_LINE_LENGTH: usize = 64 * 1024;

/// Maximum response size accepted by the client (16 MB)
pub const MAX_RESPONSE_SIZE: u64 = 16 * 1024 * 1024;

// =============================================================================
// Command Encoding/Decoding
// =============================================================================

/// Encode a command to bytes
///
/// Fails if any argument contains a line break, since that would shift every
/// following field.
pub fn encode_command(command: &Command) -> Result<Vec<u8>> {
    let mut message = Vec::new();
    message.extend_from_slice(command.command_type().name().as_bytes());
    message.push(b'\n');

    for arg in command.args() {
        if arg.contains('\n') || arg.contains('\r') {
            return Err(DbError::Protocol(format!(
                "{}: argument {:?} contains a line break",
                command.command_type().name(),
                arg
            )));
        }
        message.extend_from_slice(arg.as_bytes());
        message.push(b'\n');
    }

    Ok(message)
}

/// Decode a command from bytes
pub fn decode_command(bytes: &[u8]) -> Result<Command> {
    let mut reader = bytes;
    read_command(&mut reader)
}

/// Read a complete command from a stream
///
/// Fails if the stream ends before an operation line, or the operation is
/// unknown. Once the operation is known, missing argument lines read as empty.
pub fn read_command<R: BufRead>(reader: &mut R) -> Result<Command> {
    let name = read_line(reader)?
        .ok_or_else(|| DbError::Protocol("connection closed before request".to_string()))?;

    let command_type = CommandType::from_name(&name)
        .ok_or_else(|| DbError::Protocol(format!("unknown operation: {:?}", name)))?;

    let mut args = Vec::with_capacity(command_type.arg_count());
    for _ in 0..command_type.arg_count() {
        args.push(read_line(reader)?.unwrap_or_default());
    }

    Ok(Command::from_parts(command_type, args))
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    let bytes = encode_command(command)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read one trimmed line, or `None` at end of stream
fn read_line<R: BufRead>(reader: &mut R) -> Result<Option<String>> {
    let mut buf = Vec::new();
    let n = reader
        .by_ref()
        .take(MAX_LINE_LENGTH as u64)
        .read_until(b'\n', &mut buf)?;

    if n == 0 {
        return Ok(None);
    }
    if n == MAX_LINE_LENGTH && !buf.ends_with(b"\n") {
        return Err(DbError::Protocol(format!(
            "line exceeds {} bytes",
            MAX_LINE_LENGTH
        )));
    }

    let line = String::from_utf8(buf)
        .map_err(|_| DbError::Protocol("line is not valid UTF-8".to_string()))?;

    Ok(Some(line.trim().to_string()))
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
///
/// Appends a newline unless the text already ends in one (reports do). An
/// empty report therefore goes out as a single empty line.
pub fn encode_response(response: &Response) -> Vec<u8> {
    let mut text = response.to_string();
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text.into_bytes()
}

/// Decode a response from bytes, dropping the final newline
pub fn decode_response(bytes: &[u8]) -> Result<String> {
    let mut text = std::str::from_utf8(bytes)
        .map_err(|_| DbError::Protocol("response is not valid UTF-8".to_string()))?
        .to_string();

    if text.ends_with('\n') {
        text.pop();
        if text.ends_with('\r') {
            text.pop();
        }
    }

    Ok(text)
}

/// Read a complete response from a stream (until EOF)
pub fn read_response<R: Read>(reader: &mut R) -> Result<String> {
    let mut bytes = Vec::new();
    reader.take(MAX_RESPONSE_SIZE + 1).read_to_end(&mut bytes)?;

    if bytes.len() as u64 > MAX_RESPONSE_SIZE {
        return Err(DbError::Protocol(format!(
            "Response too large (max {} bytes)",
            MAX_RESPONSE_SIZE
        )));
    }

    decode_response(&bytes)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}
