use clap::ValueEnum;

use _model::Sale;

/// Numeric columns the IQR trim can target.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Numeric {
    Price,
    FloorArea,
    RemainingLease,
    Storey,
}

impl Numeric {
    fn get(&self, sale: &Sale) -> f64 {
        match self {
            Self::Price => sale.price,
            Self::FloorArea => sale.floor_area,
            Self::RemainingLease => sale.remaining_lease,
            Self::Storey => sale.storey as f64,
        }
    }
}

/// Drop rows outside Q1 - 1.5 IQR .. Q3 + 1.5 IQR for each selected column.
pub fn trim(mut sales: Vec<Sale>, columns: &[Numeric]) -> Vec<Sale> {
    for column in columns {
        if sales.is_empty() {
            break;
        }

        let mut values: Vec<f64> = sales.iter().map(|x| column.get(x)).collect();
        values.sort_by(f64::total_cmp);

        let q1 = quantile(&values, 0.25);
        let q3 = quantile(&values, 0.75);
        let reach = 1.5 * (q3 - q1);
        sales.retain(|x| {
            let value = column.get(x);
            value >= q1 - reach && value <= q3 + reach
        });
    }

    sales
}

// linearly interpolated, the usual statistics-package definition
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let below = sorted[position.floor() as usize];
    let above = sorted[position.ceil() as usize];
    below + (above - below) * position.fract()
}
