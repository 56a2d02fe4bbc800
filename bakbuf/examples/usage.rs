//! Lists the sections of a resource file, or of a small built-in container when no path
//! is given, and decompresses the RLE and LZSS payloads of the built-in one.
//!
//! Run with `RUST_LOG=debug` to see the codecs at work.

use anyhow::{bail, Context, Result};
use bakbuf::{
    lzss::Lzss, rle::Rle, Buffer, BufferView, Codec, CompressionMethod, FileBuffer, Tag,
};

const MESSAGE: &[u8] = b"Squire, squire, the road to Sethanon is closed. Squire, squire.";

fn main() -> Result<()> {
    env_logger::init();

    let file = match std::env::args().nth(1) {
        Some(path) => FileBuffer::open(&path).with_context(|| format!("loading {path}"))?,
        None => FileBuffer::from_vec(sample_container()?)?,
    };

    list_sections(&file.view(), 0)?;

    if std::env::args().nth(1).is_none() {
        for (tag, method) in [(Tag::SCR, CompressionMethod::Rle), (Tag::BIN, CompressionMethod::Lzss)] {
            let mut payload = file.find(tag)?;
            let mut data = FileBuffer::new(MESSAGE.len() as u32);
            payload.decompress(&mut data, method)?;
            if data.as_slice() != MESSAGE {
                bail!("{tag} did not decompress to the original message");
            }
            println!("{tag} {method:?}: {}", data.get_fixed_string(data.size())?);
        }
    }

    Ok(())
}

fn list_sections(buffer: &BufferView<'_>, depth: usize) -> Result<()> {
    for section in buffer.sections() {
        let section = section?;
        println!(
            "{:indent$}{} {} bytes",
            "",
            section.tag,
            section.data.size(),
            indent = depth * 2
        );
        if section.nested {
            list_sections(&section.data, depth + 1)?;
        } else {
            section.data.dump(std::io::stdout(), 32)?;
        }
    }
    Ok(())
}

fn sample_container() -> Result<Vec<u8>> {
    let scr = Rle::encode_to_vec(MESSAGE)?;
    let bin = Lzss::encode_to_vec(MESSAGE)?;

    let mut inner = FileBuffer::new((16 + scr.len() + bin.len()) as u32);
    put_section(&mut inner, Tag::SCR, &scr, false)?;
    put_section(&mut inner, Tag::BIN, &bin, false)?;

    let mut outer = FileBuffer::new(12 + 8 + inner.size());
    put_section(&mut outer, Tag::VER, b"1.02", false)?;
    put_section(&mut outer, Tag::RES, inner.as_slice(), true)?;
    Ok(outer.into_inner())
}

fn put_section(buffer: &mut Buffer<Vec<u8>>, tag: Tag, payload: &[u8], nested: bool) -> Result<()> {
    let mut length = payload.len() as u32;
    if nested {
        length |= bakbuf::tag::NESTED_FLAG;
    }
    buffer.put_u32_le(tag.value())?;
    buffer.put_u32_le(length)?;
    buffer.put_data(payload)?;
    Ok(())
}
