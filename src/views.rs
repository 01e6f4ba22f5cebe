//! Server-rendered prediction form.

use crate::models::{
    CityTier, ContactType, CustomerInput, Designation, FeatureRecord, FieldBounds, Gender,
    MaritalStatus, Occupation, Prediction, ProductPitched, YesNo, AGE, CHILDREN_VISITING,
    FOLLOWUPS, MONTHLY_INCOME, PERSONS_VISITING, PITCH_DURATION, PROPERTY_STAR,
    SATISFACTION_SCORE, TRIPS,
};
use std::fmt::Display;

pub const PAGE_TITLE: &str = "Tourism Package Prediction";

/// Form section headings, in display order.
pub const SECTIONS: [&str; 5] = [
    "👤 Personal Information",
    "💰 Lifestyle & Financial",
    "✈️ Travel Preferences",
    "👨‍👩‍👧 Family & Trips",
    "📞 Sales Interaction",
];

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn select<T: Copy + PartialEq + Display>(
    name: &str,
    label: &str,
    options: &[T],
    selected: T,
) -> String {
    let options: String = options
        .iter()
        .map(|option| {
            let value = escape_html(&option.to_string());
            let flag = if *option == selected { " selected" } else { "" };
            format!(r#"<option value="{value}"{flag}>{value}</option>"#)
        })
        .collect();
    format!(
        r#"<label for="{name}">{label}</label><select id="{name}" name="{name}">{options}</select>"#
    )
}

fn number(bounds: FieldBounds, value: u32) -> String {
    format!(
        r#"<label for="{field}">{label}</label><input type="number" id="{field}" name="{field}" min="{min}" max="{max}" step="1" value="{value}" required>"#,
        field = bounds.field,
        label = escape_html(bounds.label),
        min = bounds.min,
        max = bounds.max,
    )
}

fn radio(name: &str, label: &str, selected: YesNo) -> String {
    let buttons: String = YesNo::ALL
        .iter()
        .map(|option| {
            let checked = if *option == selected { " checked" } else { "" };
            format!(
                r#"<label class="inline"><input type="radio" name="{name}" value="{value}"{checked}> {value}</label>"#,
                value = option.label()
            )
        })
        .collect();
    format!(r#"<fieldset class="radio"><legend>{label}</legend>{buttons}</fieldset>"#)
}

fn section(title: &str, fields: &[String]) -> String {
    format!(
        r#"<fieldset class="section"><legend>{}</legend>{}</fieldset>"#,
        title,
        fields.concat()
    )
}

/// The five grouped input sections and the Predict button.
pub fn render_form(input: &CustomerInput) -> String {
    let personal = section(
        SECTIONS[0],
        &[
            number(AGE, input.age),
            select("gender", "Gender", Gender::ALL, input.gender),
            select(
                "marital_status",
                "Marital Status",
                MaritalStatus::ALL,
                input.marital_status,
            ),
            select("occupation", "Occupation", Occupation::ALL, input.occupation),
            select("designation", "Designation", Designation::ALL, input.designation),
            select("city_tier", "City Tier", CityTier::ALL, input.city_tier),
        ],
    );
    let lifestyle = section(
        SECTIONS[1],
        &[
            number(MONTHLY_INCOME, input.monthly_income),
            radio("own_car", "Owns a Car?", input.own_car),
            radio("passport", "Has Passport?", input.passport),
        ],
    );

    let stars: Vec<u32> = (PROPERTY_STAR.min..=PROPERTY_STAR.max).collect();
    let travel = section(
        SECTIONS[2],
        &[
            select(
                "product_pitched",
                "Product Pitched",
                ProductPitched::ALL,
                input.product_pitched,
            ),
            select(
                PROPERTY_STAR.field,
                PROPERTY_STAR.label,
                &stars,
                input.preferred_property_star,
            ),
        ],
    );
    let family = section(
        SECTIONS[3],
        &[
            number(PERSONS_VISITING, input.num_person_visiting),
            number(CHILDREN_VISITING, input.num_children_visiting),
            number(TRIPS, input.num_trips),
        ],
    );
    let sales = section(
        SECTIONS[4],
        &[
            select(
                "type_of_contact",
                "Type of Contact",
                ContactType::ALL,
                input.type_of_contact,
            ),
            number(PITCH_DURATION, input.duration_of_pitch),
            number(FOLLOWUPS, input.num_followups),
            number(SATISFACTION_SCORE, input.pitch_satisfaction_score),
        ],
    );

    format!(
        r#"<form method="post" action="/predict">{personal}{lifestyle}{travel}{family}{sales}<button type="submit">🔮 Predict</button></form>"#
    )
}

/// Verdict, confidence and the submitted record as a two-column table.
pub fn render_result(prediction: &Prediction, record: &FeatureRecord) -> String {
    let icon = if prediction.outcome.class() == 1 {
        "✅"
    } else {
        "❌"
    };
    let rows: String = record
        .entries()
        .into_iter()
        .map(|(column, value)| {
            format!(
                "<tr><th>{}</th><td>{}</td></tr>",
                column,
                escape_html(&value.to_string())
            )
        })
        .collect();

    format!(
        r#"<hr><section class="result"><h2>📊 Prediction Result</h2><p class="verdict"><strong>{icon} {label}</strong> with {confidence}% confidence</p><h3>Entered Customer Profile:</h3><table>{rows}</table></section>"#,
        label = prediction.outcome.label(),
        confidence = prediction.confidence,
    )
}

pub fn render_error(message: &str) -> String {
    format!(r#"<p class="error">⚠️ {}</p>"#, escape_html(message))
}

/// Wraps page content in the HTML shell.
pub fn render_page(body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{PAGE_TITLE}</title>
    <style>
        body {{ font-family: sans-serif; max-width: 720px; margin: 2rem auto; padding: 0 1rem; }}
        fieldset.section {{ margin-bottom: 1rem; }}
        label {{ display: block; margin-top: .5rem; }}
        label.inline {{ display: inline; margin-right: 1rem; }}
        select, input[type=number] {{ width: 100%; }}
        button {{ width: 100%; padding: .75rem; margin-top: 1rem; }}
        .verdict {{ background: #e8f5e9; padding: .75rem; }}
        .error {{ background: #fdecea; padding: .75rem; }}
        table {{ border-collapse: collapse; width: 100%; }}
        th, td {{ border: 1px solid #ddd; padding: .25rem .5rem; text-align: left; }}
    </style>
</head>
<body>
    <h1>🌍 Tourism Package Prediction App</h1>
    <p>Provide customer details below to predict whether they are likely to <strong>opt for a tourism package</strong>.</p>
    {body}
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::assemble;
    use crate::prediction::evaluate;

    #[test]
    fn test_form_contains_every_section_and_field() {
        let html = render_form(&CustomerInput::default());
        for title in SECTIONS {
            assert!(html.contains(title), "missing section {}", title);
        }
        for name in [
            "age",
            "gender",
            "marital_status",
            "occupation",
            "designation",
            "city_tier",
            "monthly_income",
            "own_car",
            "passport",
            "product_pitched",
            "preferred_property_star",
            "num_person_visiting",
            "num_children_visiting",
            "num_trips",
            "type_of_contact",
            "duration_of_pitch",
            "num_followups",
            "pitch_satisfaction_score",
        ] {
            assert!(html.contains(&format!(r#"name="{}""#, name)), "missing {}", name);
        }
        assert_eq!(html.matches("<button").count(), 1);
    }

    #[test]
    fn test_number_inputs_carry_bounds() {
        let html = render_form(&CustomerInput::default());
        assert!(html.contains(r#"name="age" min="18" max="100" step="1" value="30""#));
        assert!(html.contains(r#"name="num_trips" min="1" max="22" step="1" value="3""#));
    }

    #[test]
    fn test_selected_values_are_preserved() {
        let input = CustomerInput {
            city_tier: CityTier::Tier3,
            own_car: YesNo::No,
            ..CustomerInput::default()
        };
        let html = render_form(&input);
        assert!(html.contains(r#"<option value="Tier 3" selected>"#));
        assert!(html.contains(r#"name="own_car" value="No" checked"#));
    }

    #[test]
    fn test_result_echoes_record() {
        let record = assemble(&CustomerInput::default()).unwrap();
        let prediction = evaluate(0.5).unwrap();
        let html = render_result(&prediction, &record);

        assert!(html.contains("✅ Package Opted"));
        assert!(html.contains("50.00% confidence"));
        assert!(html.contains("<tr><th>CityTier</th><td>1</td></tr>"));
        assert_eq!(html.matches("<tr>").count(), 18);
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>"x" & 'y'</script>"#),
            "&lt;script&gt;&quot;x&quot; &amp; &#39;y&#39;&lt;/script&gt;"
        );
    }
}
