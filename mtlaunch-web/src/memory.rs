//! Marshalling into the engine's linear memory.

#![cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]

/// Allocation and writes in engine memory. Writes must go through a view
/// taken at write time: any allocation may grow memory and detach older ones.
pub trait EngineMemory {
    type Error;

    fn malloc(&self, size: usize) -> Result<u32, Self::Error>;
    /// Copy `s` in as a NUL-terminated UTF-8 string.
    fn alloc_string(&self, s: &str) -> Result<u32, Self::Error>;
    /// Store `words` starting at byte address `ptr` (4-byte aligned).
    fn write_u32s(&self, ptr: u32, words: &[u32]) -> Result<(), Self::Error>;
}

/// Build a C `argv` array (4-byte pointers, NULL terminated) and return its
/// address. Every allocation happens before the single write.
pub fn write_argv<M: EngineMemory>(memory: &M, args: &[String]) -> Result<u32, M::Error> {
    let mut pointers = args
        .iter()
        .map(|arg| memory.alloc_string(arg))
        .collect::<Result<Vec<u32>, M::Error>>()?;
    pointers.push(0);
    let argv = memory.malloc(pointers.len() * 4)?;
    memory.write_u32s(argv, &pointers)?;
    Ok(argv)
}
