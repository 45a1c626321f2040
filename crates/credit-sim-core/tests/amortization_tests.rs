use chrono::NaiveDate;
use credit_sim_core::amortization::payment::{compose_payment, level_payment};
use credit_sim_core::amortization::product::ProductParameters;
use credit_sim_core::amortization::rates::{select_guarantee_rate, GuaranteeTier};
use credit_sim_core::amortization::rounding::CurrencyRounding;
use credit_sim_core::amortization::schedule::{
    quote_monthly_payment, quote_payment, simulate, QuoteRequest, ScheduleRequest, ScheduleResult,
};
use credit_sim_core::CreditSimError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn run(principal: Decimal, periods: u32, start: NaiveDate, product: Option<&str>) -> ScheduleResult {
    let request = ScheduleRequest {
        principal,
        periods,
        start_date: Some(start),
        product_type: product.map(str::to_string),
        person_type: None,
    };
    simulate(&request, &ProductParameters::default())
        .unwrap()
        .result
}

fn assert_consistent(result: &ScheduleResult) {
    let rows = &result.schedule;
    assert_eq!(rows.len(), result.periods as usize);

    let repaid: Decimal = rows.iter().map(|r| r.principal_portion).sum();
    assert_eq!(repaid, result.principal, "principal portions must sum to principal");
    assert_eq!(rows.last().unwrap().closing_balance, Decimal::ZERO);

    assert_eq!(rows[0].opening_balance, result.principal);
    for pair in rows.windows(2) {
        assert_eq!(pair[1].opening_balance, pair[0].closing_balance);
        assert_eq!(pair[1].period, pair[0].period + 1);
        assert_eq!(pair[1].start_date, pair[0].end_date.succ_opt().unwrap());
    }
    for row in rows {
        assert_eq!(row.closing_balance, row.opening_balance - row.principal_portion);
        assert_eq!(
            row.payment_charged,
            row.principal_portion
                + row.interest
                + row.stub_interest
                + row.guarantee_fee
                + row.guarantee_fee_tax
        );
    }
}

// ===========================================================================
// Payment formula
// ===========================================================================

#[test]
fn test_zero_rate_payment() {
    let pesos = CurrencyRounding::from_unit(Decimal::ONE).unwrap();
    assert_eq!(
        level_payment(dec!(1_200_000), Decimal::ZERO, 12, &pesos).unwrap(),
        dec!(100_000)
    );
}

#[test]
fn test_payment_within_half_unit_of_closed_form() {
    let pesos = CurrencyRounding::from_unit(Decimal::ONE).unwrap();
    let cases = [
        (dec!(5_000_000), dec!(0.0183), 12u32),
        (dec!(10_000_000), dec!(0.0565), 24),
        (dec!(750_000), dec!(0.0705), 6),
        (dec!(48_000_000), dec!(0.0183), 60),
        (dec!(1_000_000), dec!(0.0705), 1),
        (dec!(123_457), dec!(0.0183), 37),
    ];
    for (principal, rate, n) in cases {
        let a = level_payment(principal, rate, n, &pesos).unwrap();
        let growth = (Decimal::ONE + rate).powu(u64::from(n));
        let exact = principal * rate / (Decimal::ONE - Decimal::ONE / growth);
        assert!(
            (a - exact).abs() <= dec!(0.5),
            "P={principal} i={rate} n={n}: A={a}, closed form {exact}"
        );
    }
}

#[test]
fn test_payment_tie_rounds_away_from_zero() {
    let pesos = CurrencyRounding::from_unit(Decimal::ONE).unwrap();
    // Exact payments of 12.5 and 100.5 per period
    assert_eq!(level_payment(dec!(25), Decimal::ZERO, 2, &pesos).unwrap(), dec!(13));
    assert_eq!(level_payment(dec!(201), Decimal::ZERO, 2, &pesos).unwrap(), dec!(101));
    assert_eq!(
        level_payment(dec!(1_000_001), Decimal::ZERO, 2, &pesos).unwrap(),
        dec!(500_001)
    );
}

#[test]
fn test_composition_for_individual_company_tier() {
    let params = ProductParameters::default();
    let c = compose_payment(dec!(10_000_000), 24, dec!(0.0565), &params).unwrap();
    assert_eq!(c.base_payment, dec!(518_584));
    assert_eq!(c.payment_with_guarantee, dec!(771_207));
    assert_eq!(c.guarantee_fee, dec!(252_623));
    assert_eq!(c.guarantee_fee_tax, dec!(47_998));
    assert_eq!(c.monthly_payment, dec!(819_205));
}

// ===========================================================================
// Rate selection
// ===========================================================================

#[test]
fn test_rate_selection_rules() {
    let p = ProductParameters::default();
    assert_eq!(
        select_guarantee_rate(dec!(6_000_000), Some("particular"), None, &p),
        p.individual_guarantee_rate_monthly
    );
    assert_eq!(
        select_guarantee_rate(dec!(4_000_000), Some("particular"), None, &p),
        p.payroll_guarantee_rate_monthly
    );
    assert_eq!(
        select_guarantee_rate(dec!(90_000_000), Some("Libranza"), None, &p),
        p.payroll_guarantee_rate_monthly
    );
}

#[test]
fn test_quote_uses_selected_tier() {
    let params = ProductParameters::default();
    let individual =
        quote_monthly_payment(dec!(10_000_000), 24, Some("particular"), None, &params).unwrap();
    let payroll =
        quote_monthly_payment(dec!(10_000_000), 24, Some("payroll-deduction"), None, &params)
            .unwrap();
    assert_eq!(individual, dec!(819_205));
    assert!(payroll > individual);

    let quote = quote_payment(
        &QuoteRequest {
            principal: dec!(10_000_000),
            periods: 24,
            product_type: None,
            person_type: Some("empresa".into()),
        },
        &params,
    )
    .unwrap();
    assert_eq!(quote.result.guarantee_tier, GuaranteeTier::IndividualCompany);
    assert_eq!(quote.result.composition.monthly_payment, individual);
}

#[test]
fn test_quote_matches_simulation_payment() {
    let params = ProductParameters::default();
    let quoted = quote_monthly_payment(dec!(5_000_000), 12, None, None, &params).unwrap();
    let simulated = run(dec!(5_000_000), 12, d(2024, 1, 15), None);
    assert_eq!(quoted, simulated.monthly_payment);
}

// ===========================================================================
// Schedules
// ===========================================================================

#[test]
fn test_reference_schedule_leap_year_start() {
    let r = run(dec!(5_000_000), 12, d(2024, 1, 15), None);
    assert_consistent(&r);

    assert_eq!(r.guarantee_tier, GuaranteeTier::Payroll);
    assert_eq!(r.monthly_payment, dec!(662_217));
    assert_eq!(r.schedule.len(), 12);
    assert_eq!(r.schedule[0].end_date, d(2024, 2, 29));
    assert_eq!(r.schedule[0].payment_charged, dec!(619_517));

    // Every regular, non-final row charges exactly the contractual payment
    for row in &r.schedule[1..11] {
        assert_eq!(row.payment_charged, r.monthly_payment, "period {}", row.period);
    }
    // First and last rows diverge from it
    assert_ne!(r.schedule[0].payment_charged, r.monthly_payment);
    let last = &r.schedule[11];
    assert_eq!(last.end_date, d(2025, 1, 31));
    assert_eq!(last.opening_balance, dec!(451_864));
    assert_eq!(last.interest, dec!(8_269));
    assert_eq!(last.payment_charged, dec!(654_474));
    assert_eq!(last.closing_balance, Decimal::ZERO);
}

#[test]
fn test_december_31_start_rolls_into_next_year() {
    let r = run(dec!(2_000_000), 12, d(2023, 12, 31), None);
    assert_consistent(&r);

    let first = &r.schedule[0];
    assert_eq!(first.stub_month_end, Some(d(2023, 12, 31)));
    assert_eq!(first.end_date, d(2024, 1, 31));
    assert_eq!(first.days, 31);
    assert_eq!(first.stub_interest, Decimal::ZERO);
    assert_eq!(first.principal_portion, dec!(150_550));

    let second = &r.schedule[1];
    assert_eq!(second.start_date, d(2024, 2, 1));
    assert_eq!(second.end_date, d(2024, 2, 29));
    assert_eq!(second.days, 28);
    assert_eq!(second.interest, dec!(31_589));

    assert_eq!(r.schedule[11].end_date, d(2024, 12, 31));
    assert_eq!(r.schedule[11].month_label, "12-2024");
}

#[test]
fn test_individual_tier_schedule() {
    let r = run(dec!(10_000_000), 24, d(2024, 3, 10), Some("particular"));
    assert_consistent(&r);
    assert_eq!(r.guarantee_tier, GuaranteeTier::IndividualCompany);
    assert_eq!(r.schedule[0].stub_interest, dec!(128_100));
    assert_eq!(r.schedule[0].principal_portion, dec!(335_584));
    assert_eq!(r.schedule[23].payment_charged, dec!(769_997));
}

#[test]
fn test_max_term_schedule_is_consistent() {
    let r = run(dec!(50_000_000), 60, d(2025, 6, 30), None);
    assert_consistent(&r);
    assert_eq!(r.schedule[59].end_date, d(2030, 6, 30));
}

#[test]
fn test_consistency_across_start_dates_and_terms() {
    let starts = [
        d(2024, 1, 1),
        d(2024, 1, 31),
        d(2024, 2, 29),
        d(2023, 2, 28),
        d(2024, 11, 15),
        d(2024, 12, 31),
    ];
    for start in starts {
        for periods in [1u32, 2, 7, 18, 36] {
            for principal in [dec!(500_000), dec!(5_000_000), dec!(23_456_789)] {
                let r = run(principal, periods, start, None);
                assert_consistent(&r);
            }
        }
    }
}

#[test]
fn test_zero_base_rate_schedule() {
    let params = ProductParameters {
        base_rate_monthly: Decimal::ZERO,
        ..Default::default()
    };
    let request = ScheduleRequest {
        principal: dec!(1_200_000),
        periods: 12,
        start_date: Some(d(2024, 1, 15)),
        product_type: None,
        person_type: None,
    };
    let r = simulate(&request, &params).unwrap().result;
    assert_consistent(&r);
    assert_eq!(r.composition.base_payment, dec!(100_000));
    assert!(r.schedule.iter().all(|row| row.interest.is_zero() && row.stub_interest.is_zero()));
    assert!(r.schedule.iter().all(|row| row.principal_portion == dec!(100_000)));
}

#[test]
fn test_simulation_is_idempotent_with_explicit_start() {
    let a = run(dec!(7_300_000), 18, d(2024, 8, 5), Some("particular"));
    let b = run(dec!(7_300_000), 18, d(2024, 8, 5), Some("particular"));
    assert_eq!(a, b);
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[test]
fn test_invalid_requests_rejected() {
    let params = ProductParameters::default();
    let bad_principal = ScheduleRequest {
        principal: dec!(-1),
        periods: 12,
        start_date: Some(d(2024, 1, 15)),
        product_type: None,
        person_type: None,
    };
    assert!(matches!(
        simulate(&bad_principal, &params),
        Err(CreditSimError::InvalidPrincipal(_))
    ));

    let no_periods = ScheduleRequest {
        principal: dec!(1_000_000),
        periods: 0,
        ..bad_principal
    };
    assert!(matches!(
        simulate(&no_periods, &params),
        Err(CreditSimError::InvalidPeriodCount { periods: 0, .. })
    ));
}

#[test]
fn test_request_json_shape() {
    let request: ScheduleRequest = serde_json::from_str(
        r#"{"principal": "5000000", "periods": 12, "start_date": "2024-01-15"}"#,
    )
    .unwrap();
    let r = simulate(&request, &ProductParameters::default()).unwrap();
    let json = serde_json::to_value(&r).unwrap();
    assert_eq!(json["result"]["monthly_payment"], "662217");
    assert_eq!(json["result"]["schedule"][0]["end_date"], "2024-02-29");
    assert!(json["result"]["schedule"][1].get("stub_month_end").is_none());
}
