use log::trace;

use super::{clear_padding, CLEAR_CODE, FIRST_FREE_CODE, INITIAL_CODE_SIZE, MAX_CODE_SIZE, TABLE_SIZE};
use crate::{buffer::Buffer, codec::finish, error::Result};

/// Most words have zero or one child, so only words branching out pay for a full
/// 256 entry child table.
#[derive(Debug, Clone)]
enum Node {
    NoChild,
    OneChild(u8, u16),
    ManyChildren(Vec<u16>),
}

/// Trie of the dictionary words, indexed by code.
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn new() -> Self {
        let mut tree = Self {
            nodes: Vec::with_capacity(TABLE_SIZE),
        };
        tree.reset();
        tree
    }

    /// Back to the 256 literals, plus a placeholder for the clear code.
    #[inline(always)]
    fn reset(&mut self) {
        self.nodes.clear();
        self.nodes.resize(FIRST_FREE_CODE as usize, Node::NoChild);
    }

    #[inline(always)]
    fn find_word(&self, prefix: u16, k: u8) -> Option<u16> {
        match &self.nodes[prefix as usize] {
            Node::NoChild => None,
            &Node::OneChild(child_k, child) => (child_k == k).then_some(child),
            Node::ManyChildren(children) => {
                let child = children[k as usize];
                (child > 0).then_some(child)
            }
        }
    }

    #[inline(always)]
    fn add(&mut self, prefix: u16, k: u8) -> u16 {
        let new_index = self.nodes.len() as u16;
        let node = &mut self.nodes[prefix as usize];

        *node = match std::mem::replace(node, Node::NoChild) {
            Node::NoChild => Node::OneChild(k, new_index),
            Node::OneChild(other_k, other_index) => {
                let mut children = vec![0; 256];
                children[other_k as usize] = other_index;
                children[k as usize] = new_index;
                Node::ManyChildren(children)
            }
            Node::ManyChildren(mut children) => {
                children[k as usize] = new_index;
                Node::ManyChildren(children)
            }
        };
        self.nodes.push(Node::NoChild);
        new_index
    }

    #[inline(always)]
    fn len(&self) -> usize {
        self.nodes.len()
    }
}

pub(super) fn encode<S, D>(src: &mut Buffer<S>, dst: &mut Buffer<D>) -> Result<u32>
where
    S: AsRef<[u8]>,
    D: AsRef<[u8]> + AsMut<[u8]>,
{
    if src.at_end() {
        return Ok(finish(dst));
    }

    let mut tree = Tree::new();
    let mut code_size = INITIAL_CODE_SIZE;
    let mut bit_count = 0u32;
    let mut current_prefix = src.get_u8()? as u16;

    while !src.at_end() {
        let k = src.get_u8()?;
        if let Some(word) = tree.find_word(current_prefix, k) {
            current_prefix = word;
        } else {
            dst.put_bits(current_prefix as u32, code_size)?;
            bit_count += code_size as u32;

            tree.add(current_prefix, k);
            current_prefix = k as u16;
            let next_code = tree.len();

            if code_size < MAX_CODE_SIZE && next_code > 1 << code_size {
                code_size += 1;
                bit_count = 0;
            }

            if next_code >= TABLE_SIZE {
                dst.put_bits(CLEAR_CODE as u32, code_size)?;
                bit_count += code_size as u32;

                dst.skip_bits();
                let padding = clear_padding(bit_count, code_size);
                trace!("lzw: dictionary full at {}, clearing", dst.tell());
                if padding > dst.bytes_left() {
                    return Err(dst.full(padding as usize));
                }
                dst.skip(padding as i32)?;

                tree.reset();
                code_size = INITIAL_CODE_SIZE;
                bit_count = 0;
            }
        }
    }

    dst.put_bits(current_prefix as u32, code_size)?;

    Ok(finish(dst))
}
