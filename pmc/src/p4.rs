//! Netburst ESCR address translation.
//!
//! On Pentium 4 processors each event select control register (ESCR) has an
//! ESCRx name, an event select number to put in the counter configuration
//! control register (CCCR), and a separate address for the WRMSR
//! instruction. The table below maps (counter number, event select number)
//! to the register address per table 15-6 in the Intel IA-32 Software
//! Developer's Manual Volume 3 (document 25366815, 2005).

#[rustfmt::skip]
const TRANSLATION: [[i32; 8]; 4] = [
    [0x3B2, 0x3B4, 0x3AA, 0x3B6, 0x3AC, 0x3C8, 0x3A2, 0x3A0], // counter 0-3
    [0x3C0, 0x3C4, 0x3C2,    -1,    -1,    -1,    -1,    -1], // counter 4-7
    [0x3A6, 0x3A4, 0x3AE, 0x3B0,    -1, 0x3A8,    -1,    -1], // counter 8-11
    [0x3BA, 0x3CA, 0x3BC, 0x3BE, 0x3B8, 0x3CC, 0x3E0,    -1], // counter 12-17
];

/// ESCR address for a counter number (0-17) and event select number (0-7).
/// Returns None for out-of-range inputs and unassigned table cells.
pub fn escr_address(counter: u32, escr_select: u32) -> Option<u32> {
    let mut n = counter;
    if n > 17 {
        return None;
    }
    if n > 15 {
        n -= 3; // counter numbers 16 and 17 continue the 12-15 group
    }
    if escr_select > 7 {
        return None;
    }
    let address = TRANSLATION[(n / 4) as usize][escr_select as usize];
    if address < 0 {
        return None;
    }
    let mut address = address as u32;
    if n & 2 != 0 {
        address += 1; // second register pair of the group is the adjacent address
    }
    Some(address)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_cell() {
        assert_eq!(escr_address(0, 0), Some(0x3B2));
    }

    #[test]
    fn adjacent_address_for_upper_pair() {
        assert_eq!(escr_address(2, 0), Some(0x3B3));
        assert_eq!(escr_address(6, 0), Some(0x3C1));
        assert_eq!(escr_address(14, 5), Some(0x3CD));
    }

    #[test]
    fn remapped_counters_above_fifteen() {
        assert_eq!(escr_address(16, 0), Some(0x3BA));
        assert_eq!(escr_address(17, 6), Some(0x3E1));
        assert_eq!(escr_address(17, 7), None);
    }

    #[test]
    fn out_of_range_inputs() {
        assert_eq!(escr_address(18, 0), None);
        assert_eq!(escr_address(0, 8), None);
        assert_eq!(escr_address(u32::MAX, 0), None);
    }

    #[test]
    fn unassigned_cells() {
        assert_eq!(escr_address(4, 3), None);
        assert_eq!(escr_address(8, 4), None);
    }

    #[test]
    fn pure_over_repeated_calls() {
        for counter in 0..=18 {
            for select in 0..=8 {
                assert_eq!(
                    escr_address(counter, select),
                    escr_address(counter, select)
                );
            }
        }
    }
}
