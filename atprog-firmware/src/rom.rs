//! Built-in ROM image for the `R` and `C` commands
//!
//! A 6502 program assembled for `$8000`: it sets 65C22 port B to output
//! and rotates a bit pattern on it forever.

pub static ROM: &[u8] = &[
    0xA9, 0xFF, // lda #$ff
    0x8D, 0x02, 0x60, // sta $6002 (DDRB)
    0xA9, 0x50, // lda #$50
    0x8D, 0x00, 0x60, // sta $6000 (PORTB)
    0x6A, // loop: ror
    0x8D, 0x00, 0x60, // sta $6000
    0x4C, 0x0A, 0x80, // jmp loop
];
