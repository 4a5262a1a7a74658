//! Little-endian wire primitives shared by every codec module.
//!
//! All binary I/O is strictly little-endian; no runtime negotiation is
//! ever performed. Strings are a u16 byte length followed by UTF-8 data.
//! A transform is stored as the three active columns of a 4x4 matrix
//! (12 floats); the fourth column is implicitly (0, 0, 0, 1).
//!
//! The checked `read_*` functions fold an early end-of-stream into
//! [`FrameError::TruncatedInput`] carrying the byte offset where the
//! stream died. Writers stay on plain `io::Result`.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use glam::{Mat4, Vec3, Vec4};
use std::io::{self, Read, Seek, Write};

use crate::error::FrameError;

fn fold_eof<S: Seek>(err: io::Error, stream: &mut S) -> FrameError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        FrameError::TruncatedInput {
            offset: stream.stream_position().unwrap_or(u64::MAX),
        }
    } else {
        FrameError::Io(err)
    }
}

pub fn read_u8<R: Read + Seek>(reader: &mut R) -> Result<u8, FrameError> {
    reader.read_u8().map_err(|e| fold_eof(e, reader))
}

pub fn read_u16<R: Read + Seek>(reader: &mut R) -> Result<u16, FrameError> {
    reader
        .read_u16::<LittleEndian>()
        .map_err(|e| fold_eof(e, reader))
}

pub fn read_u32<R: Read + Seek>(reader: &mut R) -> Result<u32, FrameError> {
    reader
        .read_u32::<LittleEndian>()
        .map_err(|e| fold_eof(e, reader))
}

pub fn read_i32<R: Read + Seek>(reader: &mut R) -> Result<i32, FrameError> {
    reader
        .read_i32::<LittleEndian>()
        .map_err(|e| fold_eof(e, reader))
}

pub fn read_u64<R: Read + Seek>(reader: &mut R) -> Result<u64, FrameError> {
    reader
        .read_u64::<LittleEndian>()
        .map_err(|e| fold_eof(e, reader))
}

pub fn read_f32<R: Read + Seek>(reader: &mut R) -> Result<f32, FrameError> {
    reader
        .read_f32::<LittleEndian>()
        .map_err(|e| fold_eof(e, reader))
}

pub fn read_bytes<R: Read + Seek>(reader: &mut R, len: usize) -> Result<Vec<u8>, FrameError> {
    let mut buf = vec![0u8; len];
    reader
        .read_exact(&mut buf)
        .map_err(|e| fold_eof(e, reader))?;
    Ok(buf)
}

pub fn read_string<R: Read + Seek>(reader: &mut R) -> Result<String, FrameError> {
    let len = read_u16(reader)? as usize;
    let buf = read_bytes(reader, len)?;
    String::from_utf8(buf)
        .map_err(|e| FrameError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

pub fn write_string<W: Write>(writer: &mut W, s: &str) -> io::Result<()> {
    writer.write_u16::<LittleEndian>(s.len() as u16)?;
    writer.write_all(s.as_bytes())
}

pub fn read_vec3<R: Read + Seek>(reader: &mut R) -> Result<Vec3, FrameError> {
    let x = read_f32(reader)?;
    let y = read_f32(reader)?;
    let z = read_f32(reader)?;
    Ok(Vec3::new(x, y, z))
}

pub fn write_vec3<W: Write>(writer: &mut W, v: Vec3) -> io::Result<()> {
    writer.write_f32::<LittleEndian>(v.x)?;
    writer.write_f32::<LittleEndian>(v.y)?;
    writer.write_f32::<LittleEndian>(v.z)
}

pub fn read_vec4<R: Read + Seek>(reader: &mut R) -> Result<Vec4, FrameError> {
    let x = read_f32(reader)?;
    let y = read_f32(reader)?;
    let z = read_f32(reader)?;
    let w = read_f32(reader)?;
    Ok(Vec4::new(x, y, z, w))
}

pub fn write_vec4<W: Write>(writer: &mut W, v: Vec4) -> io::Result<()> {
    writer.write_f32::<LittleEndian>(v.x)?;
    writer.write_f32::<LittleEndian>(v.y)?;
    writer.write_f32::<LittleEndian>(v.z)?;
    writer.write_f32::<LittleEndian>(v.w)
}

/// Read a local transform: the x, y and z columns of a 4x4 matrix.
pub fn read_transform<R: Read + Seek>(reader: &mut R) -> Result<Mat4, FrameError> {
    let x_axis = read_vec4(reader)?;
    let y_axis = read_vec4(reader)?;
    let z_axis = read_vec4(reader)?;
    Ok(Mat4::from_cols(x_axis, y_axis, z_axis, Vec4::W))
}

/// Write a local transform. The fourth column is never serialized.
pub fn write_transform<W: Write>(writer: &mut W, m: &Mat4) -> io::Result<()> {
    write_vec4(writer, m.x_axis)?;
    write_vec4(writer, m.y_axis)?;
    write_vec4(writer, m.z_axis)
}
