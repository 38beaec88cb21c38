//! End-to-end tests against the local (in-process) backend: pattern
//! scanning over a real buffer, pointer chasing, and the read/write/array/
//! string round-trip behavior the rest of the crate's default methods build
//! on.

use memview::prelude::*;

/// Allocate a buffer, write a pattern at a known offset, scan the whole
/// range and recover both overlapping hits as absolute pointers.
#[test]
fn pattern_scan_over_an_allocation() {
    let view = MemViewLocal::new();
    let mut buf = vec![0u8; 0x1000];
    buf[0x10..0x15].copy_from_slice(&[0x11, 0x22, 0x33, 0x22, 0x33]);
    let base = Address::from(buf.as_mut_ptr() as u64);

    let range = view.range(base, buf.len());
    let hits = range.scan_str("22 33").unwrap();

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].address, base + 0x11);
    assert_eq!(hits[1].address, base + 0x13);
}

/// Parsing a real-looking x86 signature and rendering it back.
#[test]
fn signature_parse_and_render() {
    let pattern = Pattern::parse("48 8B 05 ?? ?? ?? ?? E8").unwrap();
    assert_eq!(pattern.to_string(), "48 8B 05 ?? ?? ?? ?? E8");
}

/// A `TypedPointer<TypedPointer<u32>>` chases one level of indirection and
/// reattaches the same view to read the final value.
#[test]
fn pointer_chase_through_a_typed_pointer_of_pointers() {
    let view = MemViewLocal::new();

    let mut target: u32 = 0xDEADBEEF;
    let target_addr = &mut target as *mut u32 as u64;

    let mut slot: u64 = target_addr;
    let slot_addr = Address::from(&mut slot as *mut u64 as u64);

    let outer: TypedPointer<MemViewLocal, TypedPointer<MemViewLocal, u32>> =
        view.typed_ptr(slot_addr);
    let inner = outer.deref().expect("slot holds a pointer value");

    assert_eq!(inner.address(), Address::from(target_addr));
    assert_eq!(inner.deref(), Some(0xDEADBEEF));
}

/// Writing and reading back a sequence of PODs of length `k` round-trips
/// exactly.
#[test]
fn array_round_trip() {
    let view = MemViewLocal::new();
    let mut storage = [0u32; 8];
    let base = Address::from(storage.as_mut_ptr() as u64);

    let xs: Vec<u32> = vec![1, 2, 3, 4, 5, 6, 7, 8];
    let written = view.write_array(base, &xs);
    assert_eq!(written, xs.len());

    let back: Vec<u32> = view.read_array(base, xs.len());
    assert_eq!(back, xs);
}

/// Writing a UTF-8 string and reading it back recovers the original text.
#[test]
fn utf8_string_round_trip() {
    let view = MemViewLocal::new();
    let mut storage = [0u8; 32];
    let base = Address::from(storage.as_mut_ptr() as u64);

    assert!(view.write_string(base, "h\u{e9}llo", Encoding::Utf8, true));
    let s = view.read_string(base, 5, Encoding::Utf8, true);
    assert_eq!(s, "h\u{e9}llo");
}

/// `read_array` on a zero-sized element never divides by zero; it simply
/// yields nothing.
#[test]
fn read_array_of_zero_sized_type_is_empty() {
    #[derive(Copy, Clone)]
    #[repr(C)]
    struct Empty;
    unsafe impl memview::types::Pod for Empty {}

    let view = MemViewLocal::new();
    let result: Vec<Empty> = view.read_array(Address::null(), 10);
    assert!(result.is_empty());
}

/// A pattern longer than the buffer yields no matches and doesn't panic,
/// even through the full `MemRange::scan` path (not just the raw iterator).
#[test]
fn scan_with_an_oversized_pattern_yields_nothing() {
    let view = MemViewLocal::new();
    let mut buf = [0xAAu8, 0xBB];
    let base = Address::from(buf.as_mut_ptr() as u64);
    let range = view.range(base, buf.len());

    let hits = range.scan_str("AA BB CC DD").unwrap();
    assert!(hits.is_empty());
}
