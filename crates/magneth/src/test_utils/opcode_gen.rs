//! Assembling EVM bytecode by hand.

use alloc::vec::Vec;

use alloy_primitives::{Address, Bytes};
use revm::bytecode::opcode::{MSTORE, PUSH0, RETURN, REVERT};

/// A builder for assembling EVM bytecode.
#[derive(Debug, Default)]
pub struct BytecodeBuilder {
    code: Vec<u8>,
}

impl BytecodeBuilder {
    /// Build the bytecode.
    pub fn build(self) -> Bytes {
        self.code.into()
    }

    /// Get the length of the bytecode, which is also the offset of the next opcode.
    pub fn len(&self) -> usize {
        self.code.len()
    }

    /// Check if the bytecode is empty.
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Append a single opcode or byte.
    pub fn append(mut self, opcode: u8) -> Self {
        self.code.push(opcode);
        self
    }

    /// Append a series of opcodes or bytes.
    pub fn append_many(mut self, items: impl IntoIterator<Item = u8>) -> Self {
        self.code.extend(items);
        self
    }

    /// Append a PUSH opcode and the bytes to push.
    pub fn push_bytes(mut self, bytes: impl AsRef<[u8]>) -> Self {
        let bytes = bytes.as_ref();
        assert!(bytes.len() <= 32);
        self.code.push(PUSH0 + bytes.len() as u8);
        self.code.extend_from_slice(bytes);
        self
    }

    /// Append a PUSH opcode and the number to push, using the width of `T`.
    pub fn push_number<T: Into<u128> + Copy>(self, number: T) -> Self {
        let num = number.into();
        let bytes = match core::mem::size_of::<T>() {
            1 => (num as u8).to_be_bytes().to_vec(),
            2 => (num as u16).to_be_bytes().to_vec(),
            8 => (num as u64).to_be_bytes().to_vec(),
            16 => num.to_be_bytes().to_vec(),
            _ => panic!("Unsupported integer size"),
        };
        self.push_bytes(bytes)
    }

    /// Append a PUSH opcode and the address to push.
    pub fn push_address(self, address: Address) -> Self {
        self.push_bytes(address)
    }

    /// Panics unless the next opcode lands at `offset`. Pins jump targets while assembling.
    pub fn at(self, offset: u8) -> Self {
        assert_eq!(self.len(), offset as usize, "jump target out of place");
        self
    }

    /// Append a REVERT opcode with empty return data.
    pub fn revert(self) -> Self {
        self.append_many([PUSH0, PUSH0, REVERT])
    }

    /// Append a RETURN opcode with empty return data.
    pub fn return_empty(self) -> Self {
        self.append_many([PUSH0, PUSH0, RETURN])
    }

    /// Append opcodes returning the word on top of the stack.
    pub fn return_top(self) -> Self {
        self.append_many([PUSH0, MSTORE]).push_number(0x20_u8).append_many([PUSH0, RETURN])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, bytes};

    #[test]
    fn test_push_widths() {
        let code = BytecodeBuilder::default()
            .push_number(0x01_u8)
            .push_number(0x0203_u16)
            .push_address(address!("0x00000000000000000000000000000000000000ff"))
            .build();
        assert_eq!(code[..5], bytes!("6001610203")[..]);
        assert_eq!(code[5], PUSH0 + 20);
        assert_eq!(code.len(), 5 + 21);
    }

    #[test]
    fn test_return_top() {
        let code = BytecodeBuilder::default().push_number(7_u8).return_top().build();
        assert_eq!(code, bytes!("60075f5260205ff3"));
    }
}
