use crate::analysis_types::{Category, ValuePrecision};
use std::io::{self, Write};

/// Writes ranked categories out. Renderers never reorder or change values.
pub trait Renderer {
    fn render(&self, categories: &[Category], out: &mut dyn Write) -> io::Result<()>;
}

pub struct BarChartRenderer;

impl Renderer for BarChartRenderer {
    fn render(&self, categories: &[Category], out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, r#"<barchart title="Bullet Graph" left="300">"#)?;
        for category in categories {
            writeln!(
                out,
                r#"<bdata title="{}" showdata="true" color="red" unit="">"#,
                escape_attribute(&category.title)
            )?;
            for entry in category.entries.iter() {
                writeln!(
                    out,
                    r#"<bitem name="{}" value="{}" color="blue"/>"#,
                    escape_attribute(&entry.name),
                    format_value(entry.value, category.precision)
                )?;
            }
            writeln!(out, "</bdata>")?;
        }
        writeln!(out, "</barchart>")
    }
}

pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, categories: &[Category], out: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *out, categories)?;
        writeln!(out)
    }
}

pub fn format_value(value: f64, precision: ValuePrecision) -> String {
    match precision {
        ValuePrecision::Float => format!("{:.6}", value),
        ValuePrecision::Integer => format!("{:.0}", value),
    }
}

fn escape_attribute(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis_types::RankedEntry;

    fn categories() -> Vec<Category> {
        let mut scouts = Category::new("Average Scout Kills", ValuePrecision::Float);
        scouts.entries = vec![
            RankedEntry { name: "b4nny".to_string(), value: 12.5 },
            RankedEntry { name: "\"quoted\" & <odd>".to_string(), value: 4.0 },
        ];
        let mut totals = Category::new("Total Demoman Kills", ValuePrecision::Integer);
        totals.entries = vec![RankedEntry { name: "habib".to_string(), value: 31.0 }];
        vec![scouts, totals, Category::new("Average Soldier Kills", ValuePrecision::Float)]
    }

    fn render_to_string(renderer: &dyn Renderer, categories: &[Category]) -> String {
        let mut buffer = Vec::new();
        renderer.render(categories, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    fn attribute<'a>(line: &'a str, key: &str) -> &'a str {
        let start = line.find(&format!("{key}=\"")).unwrap() + key.len() + 2;
        let end = start + line[start..].find('"').unwrap();
        &line[start..end]
    }

    fn unescape(raw: &str) -> String {
        raw.replace("&quot;", "\"")
            .replace("&apos;", "'")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&amp;", "&")
    }

    #[test]
    fn bar_chart_layout() {
        let output = render_to_string(&BarChartRenderer, &categories());
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], r#"<barchart title="Bullet Graph" left="300">"#);
        assert_eq!(
            lines[1],
            r#"<bdata title="Average Scout Kills" showdata="true" color="red" unit="">"#
        );
        assert_eq!(lines[2], r#"<bitem name="b4nny" value="12.500000" color="blue"/>"#);
        assert_eq!(lines[6], r#"<bitem name="habib" value="31" color="blue"/>"#);
        assert_eq!(
            lines[8],
            r#"<bdata title="Average Soldier Kills" showdata="true" color="red" unit="">"#
        );
        assert_eq!(lines[9], "</bdata>");
        assert_eq!(lines.last(), Some(&"</barchart>"));
    }

    #[test]
    fn bar_chart_reads_back_the_same_pairs() {
        let categories = categories();
        let output = render_to_string(&BarChartRenderer, &categories);

        let mut parsed: Vec<(String, Vec<(String, f64)>)> = Vec::new();
        for line in output.lines() {
            if line.starts_with("<bdata") {
                parsed.push((unescape(attribute(line, "title")), Vec::new()));
            } else if line.starts_with("<bitem") {
                let value = attribute(line, "value").parse::<f64>().unwrap();
                parsed.last_mut().unwrap().1.push((unescape(attribute(line, "name")), value));
            }
        }

        let expected: Vec<(String, Vec<(String, f64)>)> = categories
            .iter()
            .map(|c| {
                let pairs = c.entries.iter().map(|e| (e.name.clone(), e.value)).collect();
                (c.title.clone(), pairs)
            })
            .collect();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn json_reads_back_the_same_categories() {
        let categories = categories();
        let output = render_to_string(&JsonRenderer, &categories);
        let parsed: Vec<Category> = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed, categories);
    }

    #[test]
    fn empty_report_is_just_the_container() {
        let output = render_to_string(&BarChartRenderer, &[]);
        assert_eq!(output, "<barchart title=\"Bullet Graph\" left=\"300\">\n</barchart>\n");
    }
}
