use criterion::{Criterion, black_box, criterion_group, criterion_main};
use crop_advisor::api::FarmConditions;
use crop_advisor::recommendation::{build_prompt, parse_recommendation};

const OBJECT: &str = r#"{
    "crop_name": "Rice",
    "planting_season": "Kharif season (June-July)",
    "care_instructions": ["Maintain standing water", "Split nitrogen doses", "Monitor for stem borer"],
    "expected_yield": "20-25 quintals per acre",
    "market_value": "₹2183 per quintal"
}"#;

const ARRAY_WRAPPED: &str = r#"```json
[{
    "crop_name": {"description": "Groundnut"},
    "planting_season": "June-July",
    "care_instructions": ["Apply gypsum at flowering"],
    "expected_yield": "8-10 quintals per acre",
    "market_value": {"current_price": "₹5850 per quintal", "demand": "High"}
}]
```"#;

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_plain_object", |b| {
        b.iter(|| parse_recommendation(black_box(OBJECT)))
    });

    c.bench_function("parse_fenced_array_with_coercion", |b| {
        b.iter(|| parse_recommendation(black_box(ARRAY_WRAPPED)))
    });
}

fn bench_prompt(c: &mut Criterion) {
    let conditions = FarmConditions::new("Punjab", "Alluvial", "Rabi", "5 acres");
    c.bench_function("build_prompt", |b| b.iter(|| build_prompt(black_box(&conditions))));
}

criterion_group!(benches, bench_parse, bench_prompt);
criterion_main!(benches);
