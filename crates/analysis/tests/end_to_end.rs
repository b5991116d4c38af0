//! Black-box tests through the public analysis surface.

use roiforge_analysis::{AnalysisKind, AnalysisRunner, AnalysisScheduler};
use roiforge_config::{NumericBackend, Settings};
use roiforge_core::{BusinessInputs, InputField};
use roiforge_engine::PaybackPeriod;
use roiforge_scenarios::{Multipliers, ScenarioDefinition};

fn example_inputs() -> BusinessInputs {
    BusinessInputs::builder()
        .annual_revenue(2_000_000.0)
        .monthly_orders(5_000.0)
        .avg_order_value(33.33)
        .labor_costs(8_000.0)
        .shipping_costs(5_000.0)
        .error_costs(2_000.0)
        .inventory_costs(3_000.0)
        .service_investment(50_000.0)
        .company_name("Example Retail")
        .industry("ecommerce")
        .build()
        .unwrap()
}

fn seeded_runner() -> AnalysisRunner {
    let mut settings = Settings::default();
    settings.simulation.seed = Some(2024);
    settings.simulation.backend = NumericBackend::Parallel;
    AnalysisRunner::new(settings)
}

#[test]
fn comprehensive_report_for_worked_example() {
    roiforge_observability::init();
    let runner = seeded_runner();
    let report = runner
        .run(&runner.comprehensive_job(example_inputs(), true))
        .unwrap();

    assert_eq!(report.kind, AnalysisKind::Comprehensive);
    assert_eq!(report.company_name.as_deref(), Some("Example Retail"));

    let analysis = &report.output;
    assert!((analysis.roi.monthly_savings - 8_550.0).abs() < 1e-9);
    assert!((analysis.roi.annual_savings - 102_600.0).abs() < 1e-6);
    assert!((analysis.roi.first_year_roi_percentage - 105.2).abs() < 1e-9);
    match analysis.roi.payback_period {
        PaybackPeriod::Months(m) => assert!((m - 5.848).abs() < 1e-3),
        PaybackPeriod::Never => panic!("payback should be reachable"),
    }

    // quick mode
    assert_eq!(analysis.simulation.iterations, 1_000);
    assert_eq!(analysis.simulation.seed, 2024);

    assert_eq!(
        analysis.sensitivity.most_sensitive().unwrap().variable,
        InputField::ServiceInvestment
    );
    assert!(
        analysis
            .sensitivity
            .get(InputField::ServiceInvestment)
            .unwrap()
            .sensitivity_coefficient
            < 0.0
    );

    assert_eq!(analysis.scenarios.best.as_deref(), Some("best"));
    let realistic = analysis
        .breakeven
        .iter()
        .find(|r| r.scenario == "realistic")
        .unwrap();
    assert_eq!(realistic.breakeven_month, Some(6));
}

#[test]
fn seeded_simulation_reports_are_reproducible() {
    let runner = seeded_runner();
    let job = runner.simulation_job(example_inputs(), true);
    let a = runner.run(&job).unwrap();
    let b = runner.run(&job).unwrap();

    assert_ne!(a.id, b.id);
    assert_eq!(a.output, b.output);
}

#[test]
fn report_serializes_to_json() {
    let runner = AnalysisRunner::default();
    let report = runner.run(&runner.roi_job(example_inputs())).unwrap();
    let json = report.to_json_value().unwrap();

    assert_eq!(json["kind"], "roi");
    assert_eq!(json["company_name"], "Example Retail");
    assert_eq!(json["output"]["payback_period"]["status"], "months");
    assert!(json["id"].is_string());
    assert!(json.get("batch_id").is_none());

    let text = report.to_json().unwrap();
    assert!(text.contains("\"first_year_roi_percentage\""));
}

#[test]
fn custom_scenarios_compare_against_cached_baseline() {
    let runner = AnalysisRunner::default();
    let mut cheaper: Multipliers = Multipliers::new();
    cheaper.insert(InputField::ServiceInvestment, 0.5);
    let scenarios = vec![
        ScenarioDefinition::new("half price", cheaper),
        ScenarioDefinition::new("no change", Multipliers::new()),
    ];

    let report = runner
        .run(&runner.scenario_job(example_inputs(), scenarios))
        .unwrap();
    let comparison = report.output;

    assert_eq!(comparison.best.as_deref(), Some("half price"));
    assert_eq!(comparison.worst.as_deref(), Some("no change"));
    assert_eq!(comparison.scenarios[1].result, comparison.baseline);
}

#[test]
fn settings_file_drives_the_runner() {
    let settings = Settings::from_toml_str(
        r#"
        [engine]
        discount_rate = 0.08

        [breakeven]
        horizon_months = 5
        "#,
    )
    .unwrap();
    let runner = AnalysisRunner::new(settings);

    let breakeven = runner
        .run(&runner.breakeven_job(example_inputs()))
        .unwrap()
        .output;
    let months: Vec<Option<u32>> = breakeven.iter().map(|r| r.breakeven_month).collect();
    assert_eq!(months, vec![None, None, Some(5)]);

    let default_npv = AnalysisRunner::default()
        .run(&AnalysisRunner::default().roi_job(example_inputs()))
        .unwrap()
        .output
        .npv;
    let npv = runner.run(&runner.roi_job(example_inputs())).unwrap().output.npv;
    assert!(npv > default_npv);
}
