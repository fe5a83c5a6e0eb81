/// Unpack RLE-compressed row bytes, zero-padding to at least `unpacked_size`.
///
/// Each control byte holds two runs, low nibble first. Per nibble the high bit
/// selects a zero run of `len + 1` bytes (no input consumed) and otherwise a
/// literal run copying `8 - len` input bytes, where `len` is the low three bits.
pub fn rle_unpack(data: &[u8], unpacked_size: usize) -> Vec<u8> {
	let mut out = Vec::with_capacity(unpacked_size);
	let mut i = 0;

	while i < data.len() {
		let control = data[i];
		i += 1;

		let tlen = usize::from(control & 0x07);
		let tzero = control & 0x08 != 0;
		let blen = usize::from((control >> 4) & 0x07);
		let bzero = control & 0x80 != 0;

		if tzero {
			out.resize(out.len() + tlen + 1, 0);
		} else if !copy_literal(data, &mut i, 8 - tlen, &mut out) {
			break;
		}

		if i == data.len() {
			break;
		}

		if bzero {
			out.resize(out.len() + blen + 1, 0);
		} else if !copy_literal(data, &mut i, 8 - blen, &mut out) {
			break;
		}
	}

	if out.len() < unpacked_size {
		out.resize(unpacked_size, 0);
	}
	out
}

/// Copy up to `count` bytes; false when input ran out first.
fn copy_literal(data: &[u8], i: &mut usize, count: usize, out: &mut Vec<u8>) -> bool {
	let end = (*i + count).min(data.len());
	out.extend_from_slice(&data[*i..end]);
	let complete = end - *i == count;
	*i = end;
	complete
}
