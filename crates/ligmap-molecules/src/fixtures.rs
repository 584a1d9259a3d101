//! Structure snippets shared by unit tests.

/// Two-chain complex: ALA/GLY polymer, 7QZ x2, EDO x2, SO4, HOH x3.
pub const MINI_COMPLEX: &str = include_str!("../tests/data/mini_complex.pdb");

/// One fixed-column coordinate record.
pub fn atom_line(record: &str, serial: u32, atom: &str, resname: &str, chain: char, seq: i32) -> String {
    format!(
        "{:<6}{:>5} {:<4} {:>3} {}{:>4}    {:>8.3}{:>8.3}{:>8.3}  1.00 20.00",
        record, serial, atom, resname, chain, seq, 1.0, 2.0, 3.0
    )
}

/// A structure holding `count` single-atom residues of each `(name, count)` pair as HETATM.
pub fn hetero_structure(groups: &[(&str, usize)]) -> String {
    let mut lines = vec![
        atom_line("ATOM", 1, "N", "ALA", 'A', 1),
        atom_line("ATOM", 2, "CA", "ALA", 'A', 1),
    ];
    let mut serial = 3;
    let mut seq = 100;
    for (name, count) in groups {
        for _ in 0..*count {
            lines.push(atom_line("HETATM", serial, "X1", name, 'A', seq));
            serial += 1;
            seq += 1;
        }
    }
    lines.push("END".to_string());
    lines.join("\n")
}
