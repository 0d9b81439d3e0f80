//! Built-in geotextile catalog: nine material properties, five clusters each.

use super::model::{ChoiceOption, Step, Tier, Topic};

/// (tag, name, range, typical use, inclusive upper bound)
type TierRow = (&'static str, &'static str, &'static str, &'static str, Option<f64>);

struct Parameter {
    key: &'static str,
    label: &'static str,
    field_name: &'static str,
    /// Lower-case noun used inside prompts.
    noun: &'static str,
    tiers: [TierRow; 5],
}

const PARAMETERS: [Parameter; 9] = [
    Parameter {
        key: "tensile_strength",
        label: "Tensile Strength (kN/m)",
        field_name: "Tensile Cluster",
        noun: "tensile strength",
        tiers: [
            ("C1", "Low Strength", "0–30 kN/m", "Landscaping, temporary erosion control, lightweight drainage layers.", Some(30.0)),
            ("C2", "Medium Strength", "31–60 kN/m", "Subgrade separation in rural roads, light-duty roads.", Some(60.0)),
            ("C3", "High Strength", "61–120 kN/m", "Reinforcement of paved roads, embankment stabilization.", Some(120.0)),
            ("C4", "Very High Strength", "121–200 kN/m", "Retaining walls, heavy-duty highways, soft soil improvement.", Some(200.0)),
            ("C5", "Ultra High Strength", ">200 kN/m", "Critical structures, mining haul roads, high embankments.", None),
        ],
    },
    Parameter {
        key: "puncture_resistance",
        label: "Puncture Resistance (N)",
        field_name: "Puncture Cluster",
        noun: "puncture resistance",
        tiers: [
            ("C1", "Low Resistance", "≤ 600 N", "Light separation, erosion control, vegetated slopes.", Some(600.0)),
            ("C2", "Medium Resistance", "601–1000 N", "Subgrade stabilization for light vehicle paths.", Some(1000.0)),
            ("C3", "High Resistance", "1001–1400 N", "Urban roads, temporary working platforms.", Some(1400.0)),
            ("C4", "Very High Resistance", "1401–1800 N", "Pavement base reinforcement, embankments.", Some(1800.0)),
            ("C5", "Ultra High Resistance", ">1800 N", "Reinforced earth structures, heavy-duty traffic zones.", None),
        ],
    },
    Parameter {
        key: "permittivity",
        label: "Permittivity (s⁻¹)",
        field_name: "Permittivity Cluster",
        noun: "permittivity",
        tiers: [
            ("C1", "Very Low", "≤ 0.2 s⁻¹", "Reinforcement with minimal flow, base stabilization.", Some(0.2)),
            ("C2", "Low", "0.21–0.5 s⁻¹", "Separation with controlled flow, coarse soils.", Some(0.5)),
            ("C3", "Moderate", "0.51–1.0 s⁻¹", "General drainage, moderate rainfall zones.", Some(1.0)),
            ("C4", "High", "1.01–1.5 s⁻¹", "High-permeability filters, soft soils.", Some(1.5)),
            ("C5", "Very High", ">1.5 s⁻¹", "Rapid drainage, flood-prone zones, underdrains.", None),
        ],
    },
    Parameter {
        key: "filtration_efficiency",
        label: "Filtration Efficiency (%)",
        field_name: "Filtration Cluster",
        noun: "filtration efficiency",
        tiers: [
            ("C1", "Low", "≤ 75%", "Temporary applications, basic separation.", Some(75.0)),
            ("C2", "Moderate", "76–85%", "General soil separation, stable soils.", Some(85.0)),
            ("C3", "High", "86–90%", "Urban road filtration, culverts.", Some(90.0)),
            ("C4", "Very High", "91–95%", "Fine silty soils, sensitive drainage.", Some(95.0)),
            ("C5", "Ultra High", ">95%", "Critical water treatment, coastal filters.", None),
        ],
    },
    Parameter {
        key: "recycled_content",
        label: "Recycled Content (%)",
        field_name: "Recycled Cluster",
        noun: "recycled content",
        tiers: [
            ("C1", "Virgin Material", "0%", "Traditional PP/PET geotextiles.", Some(0.0)),
            ("C2", "Low Recycled", "1–30%", "Minimal environmental impact, some sustainability.", Some(30.0)),
            ("C3", "Moderate Recycled", "31–60%", "Balanced environmental and structural performance.", Some(60.0)),
            ("C4", "High Recycled", "61–99%", "Strong sustainability focus, check strength tradeoffs.", Some(99.0)),
            ("C5", "Fully Recycled", "100%", "Circular economy materials, sustainability prioritized.", None),
        ],
    },
    Parameter {
        key: "biobased_content",
        label: "Biobased Content (%)",
        field_name: "Biobased Cluster",
        noun: "biobased content",
        tiers: [
            ("C1", "Non-Biobased", "0%", "Petroleum-based synthetics (PP, PET, HDPE).", Some(0.0)),
            ("C2", "Low Biobased", "1–30%", "Partially blended PP + natural fibers.", Some(30.0)),
            ("C3", "Moderate Biobased", "31–70%", "Emerging composites, experimental blends.", Some(70.0)),
            ("C4", "High Biobased", "71–99%", "Mostly natural-fiber or PLA-based materials.", Some(99.0)),
            ("C5", "Fully Biobased", "100%", "Jute, coir, PLA – biodegradable geotextiles.", None),
        ],
    },
    Parameter {
        key: "uv_strength",
        label: "UV Strength Retained (% after 500h)",
        field_name: "UV Cluster",
        noun: "UV strength retained",
        tiers: [
            ("C1", "Very Low", "≤ 30%", "Highly degradable, natural fibers like jute/coir.", Some(30.0)),
            ("C2", "Low", "31–50%", "Moderate vulnerability, natural-synthetic hybrids.", Some(50.0)),
            ("C3", "Moderate", "51–70%", "Standard UV resistance for most synthetics.", Some(70.0)),
            ("C4", "High", "71–85%", "UV-stabilized synthetics, woven PET/PP.", Some(85.0)),
            ("C5", "Very High", ">85%", "Premium coated materials, long-life geotextiles.", None),
        ],
    },
    Parameter {
        key: "material_cost",
        label: "Material Cost (PHP/m²)",
        field_name: "Material Cost Cluster",
        noun: "material cost",
        tiers: [
            ("C1", "Low Cost", "≤ PHP 100/m²", "Lightweight nonwovens, coir/jute mats.", Some(100.0)),
            ("C2", "Moderate Cost", "PHP 101–200/m²", "Basic woven geotextiles, hybrid blends.", Some(200.0)),
            ("C3", "High Cost", "PHP 201–400/m²", "Reinforcement-grade PP/PET fabrics.", Some(400.0)),
            ("C4", "Very High Cost", "PHP 401–700/m²", "Composite or geogrid-enhanced fabrics.", Some(700.0)),
            ("C5", "Ultra High Cost", "> PHP 700/m²", "Premium, specialized, export-grade types.", None),
        ],
    },
    Parameter {
        key: "installation_cost",
        label: "Installation Cost (PHP/m²)",
        field_name: "Install Cost Cluster",
        noun: "installation cost",
        tiers: [
            ("C1", "Low Cost", "≤ PHP 50/m²", "Manual placement, erosion blankets.", Some(50.0)),
            ("C2", "Moderate Cost", "PHP 51–100/m²", "Routine rolls for subgrade support.", Some(100.0)),
            ("C3", "High Cost", "PHP 101–200/m²", "Reinforcement under pavements.", Some(200.0)),
            ("C4", "Very High Cost", "PHP 201–350/m²", "Composite installations, constrained sites.", Some(350.0)),
            ("C5", "Ultra High Cost", "> PHP 350/m²", "MSE, steep slopes, geogrid anchoring.", None),
        ],
    },
];

const EXPLAINER: &str = "Each parameter takes a couple of quick questions. Your answers are \
grouped into clusters from C1 (lowest) to C5 (highest), and the classifier works from those clusters.";

pub const SKIP_TEXT: &str = "Skip for now";
pub const NOT_SURE_TEXT: &str = "Not sure";

/// Build the topics in their canonical order.
pub(crate) fn topics() -> Vec<Topic> {
    PARAMETERS
        .iter()
        .enumerate()
        .map(|(i, param)| {
            let mut topic = build_topic(param);
            if i == 0 {
                topic.steps.insert(
                    0,
                    Step {
                        prompt: EXPLAINER.to_string(),
                        options: vec![ChoiceOption::tagged("Got it", &[])],
                    },
                );
            }
            topic
        })
        .collect()
}

fn build_topic(param: &Parameter) -> Topic {
    let tiers: Vec<Tier> = param
        .tiers
        .iter()
        .map(|&(tag, name, range, description, upper_bound)| Tier {
            tag: tag.to_string(),
            name: name.to_string(),
            range: range.to_string(),
            description: description.to_string(),
            upper_bound,
        })
        .collect();

    let mut application: Vec<ChoiceOption> = tiers
        .iter()
        .map(|t| ChoiceOption::tagged(t.description.clone(), &[t.tag.as_str()]))
        .collect();
    application.push(ChoiceOption::skip(SKIP_TEXT));

    let mut range: Vec<ChoiceOption> = tiers
        .iter()
        .map(|t| ChoiceOption::tagged(format!("{}: {} ({})", t.tag, t.name, t.range), &[t.tag.as_str()]))
        .collect();
    range.push(ChoiceOption::tagged(NOT_SURE_TEXT, &[]));

    Topic {
        key: param.key.to_string(),
        label: param.label.to_string(),
        field_name: param.field_name.to_string(),
        tiers,
        steps: vec![
            Step {
                prompt: format!(
                    "Which application is closest to what you need the {} for?",
                    param.noun
                ),
                options: application,
            },
            Step {
                prompt: format!(
                    "Which {} range are you targeting? You can also type a measured value.",
                    param.noun
                ),
                options: range,
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nine_topics_in_backend_order() {
        let keys: Vec<String> = topics().into_iter().map(|t| t.key).collect();
        assert_eq!(
            keys,
            [
                "tensile_strength",
                "puncture_resistance",
                "permittivity",
                "filtration_efficiency",
                "recycled_content",
                "biobased_content",
                "uv_strength",
                "material_cost",
                "installation_cost",
            ]
        );
    }

    #[test]
    fn field_names_match_backend_columns() {
        let fields: Vec<String> = topics().into_iter().map(|t| t.field_name).collect();
        assert_eq!(fields[0], "Tensile Cluster");
        assert_eq!(fields[6], "UV Cluster");
        assert_eq!(fields[8], "Install Cost Cluster");
    }

    #[test]
    fn first_topic_opens_with_explainer() {
        let all = topics();
        assert!(all[0].steps[0].is_acknowledge());
        assert_eq!(all[0].steps.len(), 3);
        assert!(all[1..].iter().all(|t| t.steps.len() == 2));
    }

    #[test]
    fn every_application_step_offers_a_skip() {
        for topic in topics() {
            let application = topic.steps.iter().find(|s| !s.is_acknowledge()).unwrap();
            let skip = application.options.last().unwrap();
            assert!(skip.skip, "{} has no skip option", topic.key);
            assert_eq!(application.options.len(), 6);
        }
    }

    #[test]
    fn thresholds_follow_cluster_table() {
        let all = topics();
        let recycled = all.iter().find(|t| t.key == "recycled_content").unwrap();
        assert_eq!(recycled.bucket(0.0).unwrap().tag, "C1");
        assert_eq!(recycled.bucket(0.5).unwrap().tag, "C2");
        assert_eq!(recycled.bucket(99.0).unwrap().tag, "C4");
        assert_eq!(recycled.bucket(100.0).unwrap().tag, "C5");

        let permittivity = all.iter().find(|t| t.key == "permittivity").unwrap();
        assert_eq!(permittivity.bucket(0.35).unwrap().tag, "C2");
        assert_eq!(permittivity.bucket(2.0).unwrap().tag, "C5");
    }
}
