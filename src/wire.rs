// src/wire.rs
//! Order protocol codec.
//!
//! One order exchange on the wire is: the client sends a 4-byte little-endian
//! signed integer carrying the requested product id (no framing, no length
//! prefix), and the server replies with one NUL-terminated text line. The
//! integer byte order is fixed little-endian so both roles agree on any host.
//! Responses are built bounded; [`MAX_RESPONSE`] is the hard ceiling.

use anyhow::{bail, Result};
use bytes::Bytes;
use itoa::Buffer;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::catalog::{Cents, Outcome};

/// Upper bound on one encoded response, NUL terminator included.
pub const MAX_RESPONSE: usize = 1024;

#[inline(always)]
fn push_str(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(s.as_bytes());
}

#[inline(always)]
fn push_u64(out: &mut Vec<u8>, buf: &mut Buffer, v: u64) {
    push_str(out, buf.format(v));
}

/// Cents as dollars with exactly two decimals, e.g. `$12.30`.
#[inline(always)]
fn push_price(out: &mut Vec<u8>, buf: &mut Buffer, cents: Cents) {
    out.push(b'$');
    push_u64(out, buf, cents / 100);
    out.push(b'.');
    let frac = (cents % 100) as u8;
    out.push(b'0' + frac / 10);
    out.push(b'0' + frac % 10);
}

/// Encodes one order response, NUL terminator included.
pub fn encode_outcome(outcome: &Outcome) -> Bytes {
    let mut out = Vec::with_capacity(96);
    let mut b = Buffer::new();

    match outcome {
        Outcome::Purchased {
            description,
            price_cents,
        } => {
            push_str(&mut out, "Order successful: ");
            push_str(&mut out, description);
            push_str(&mut out, ", Total: ");
            push_price(&mut out, &mut b, *price_cents);
            out.push(b'\n');
        }
        Outcome::OutOfStock { description } => {
            push_str(&mut out, "Order failed: ");
            push_str(&mut out, description);
            push_str(&mut out, " is out of stock\n");
        }
    }

    out.push(0);
    debug_assert!(out.len() <= MAX_RESPONSE);
    Bytes::from(out)
}

/// Reads one order request: exactly 4 bytes, little-endian i32.
pub async fn read_request<R: AsyncRead + Unpin>(r: &mut R) -> std::io::Result<i32> {
    let mut raw = [0u8; 4];
    r.read_exact(&mut raw).await?;
    Ok(i32::from_le_bytes(raw))
}

/// Writes one order request. Client side of [`read_request`].
pub async fn write_request<W: AsyncWrite + Unpin>(w: &mut W, product_id: i32) -> std::io::Result<()> {
    w.write_all(&product_id.to_le_bytes()).await
}

/// Reads one response up to and including its NUL terminator, returning the
/// text without the terminator. Errors if the sender exceeds [`MAX_RESPONSE`].
pub async fn read_response<R: AsyncRead + Unpin>(r: &mut R) -> Result<String> {
    let mut out = Vec::with_capacity(96);
    let mut byte = [0u8; 1];

    loop {
        r.read_exact(&mut byte).await?;
        if byte[0] == 0 {
            break;
        }
        out.push(byte[0]);
        if out.len() >= MAX_RESPONSE {
            bail!("response exceeds {MAX_RESPONSE} bytes");
        }
    }

    Ok(String::from_utf8(out)?)
}
