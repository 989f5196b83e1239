use rust_xlsxwriter::{Format, Workbook, XlsxError};

const OPERATORS: [&str; 4] = ["OMEGA NET", "ALFA TELECOM", "BETA FIBRA", "GAMA LINK"];
const INSTALLATIONS: [&str; 4] = [
    "RODOVIÁRIO (ENTERRADO)",
    "RODOVIÁRIO (AÉREO)",
    "FERROVIÁRIO",
    "URBANO (DUTO)",
];
const MONTHS: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

fn main() -> Result<(), XlsxError> {
    let mut rng = SimpleRng::new(42);
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let bold = Format::new().set_bold();

    let mut headers = vec!["Km", "Operadora", "Rota", "Instalacao"];
    headers.extend(MONTHS);
    for (col, name) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *name, &bold)?;
    }

    let n_routes = 120;
    for i in 0..n_routes {
        let row = i as u32 + 1;
        let km = (5.0 + rng.next_f64() * 295.0) * 10.0;
        let from = i % 40 + 1;
        let to = (i + 1 + (rng.next_u64() % 7) as usize) % 40 + 1;

        sheet.write_number(row, 0, km.round() / 10.0)?;
        sheet.write_string(row, 1, rng.pick(&OPERATORS))?;
        sheet.write_string(row, 2, format!("CIDADE {from} - CIDADE {to}"))?;
        sheet.write_string(row, 3, rng.pick(&INSTALLATIONS))?;
        for m in 0..MONTHS.len() {
            // Outage counters: mostly zero, occasionally one or two.
            let outages = match rng.next_f64() {
                p if p < 0.85 => 0.0,
                p if p < 0.97 => 1.0,
                _ => 2.0,
            };
            sheet.write_number(row, 4 + m as u16, outages)?;
        }
    }

    let output_path = "sample_routes.xlsx";
    workbook.save(output_path)?;

    println!("Wrote {n_routes} routes to {output_path}");
    Ok(())
}
