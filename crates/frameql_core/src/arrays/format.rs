use std::fmt::Write as _;

use frameql_error::Result;

use super::batch::Batch;
use super::field::Schema;

/// Render batches as an aligned text table.
pub fn pretty_print<'a, I>(schema: &Schema, batches: I) -> Result<String>
where
    I: IntoIterator<Item = &'a Batch>,
{
    let header: Vec<String> = schema
        .fields
        .iter()
        .map(|f| format!("{} ({})", f.name, f.datatype))
        .collect();

    let mut rows: Vec<Vec<String>> = Vec::new();
    for batch in batches {
        for idx in 0..batch.num_rows() {
            let row = batch
                .columns()
                .iter()
                .map(|col| col.value(idx).map(|v| v.to_string()).unwrap_or_default())
                .collect();
            rows.push(row);
        }
    }

    let mut widths: Vec<usize> = header.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (idx, val) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(idx) {
                *w = usize::max(*w, val.len());
            }
        }
    }

    let mut buf = String::new();
    write_row(&mut buf, &header, &widths)?;

    let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    write_row(&mut buf, &sep, &widths)?;

    for row in &rows {
        write_row(&mut buf, row, &widths)?;
    }

    write!(buf, "({} rows)", rows.len())?;

    Ok(buf)
}

fn write_row(buf: &mut String, vals: &[String], widths: &[usize]) -> Result<()> {
    for (idx, (val, width)) in vals.iter().zip(widths).enumerate() {
        if idx > 0 {
            write!(buf, " | ")?;
        }
        write!(buf, "{val:<width$}")?;
    }
    writeln!(buf)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrays::array::Array;
    use crate::arrays::datatype::DataType;
    use crate::arrays::field::Field;

    #[test]
    fn pretty_simple() {
        let schema = Schema::new([
            Field::new("a", DataType::Int64, true),
            Field::new("b", DataType::Utf8, true),
        ]);
        let batch = Batch::try_new([
            Array::Int64(vec![Some(1), None]),
            Array::Utf8(vec![Some("hello".to_string()), Some("x".to_string())]),
        ])
        .unwrap();

        let out = pretty_print(&schema, [&batch]).unwrap();
        let expected = "\
a (Int64) | b (Utf8)
--------- | --------
1         | hello   
NULL      | x       
(2 rows)";
        assert_eq!(expected, out);
    }
}
