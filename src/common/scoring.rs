// src/common/scoring.rs

use rust_decimal::{Decimal, RoundingStrategy};

pub const MAX_SCORE: Decimal = Decimal::TEN;

/// Nota de um pilar: respostas "sim" / total de perguntas × 10, com uma casa decimal.
pub fn pillar_score(positive_answers: usize, total_questions: usize) -> Decimal {
    if total_questions == 0 {
        return Decimal::ZERO;
    }

    let positive = positive_answers.min(total_questions);
    let raw = Decimal::from(positive as u64) * MAX_SCORE / Decimal::from(total_questions as u64);

    round1(raw)
}

/// Média simples. `None` quando não há nada para agregar.
pub fn mean<I>(scores: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    let (sum, count) = scores
        .into_iter()
        .fold((Decimal::ZERO, 0u64), |(sum, count), score| (sum + score, count + 1));

    (count > 0).then(|| sum / Decimal::from(count))
}

/// Arredonda para uma casa decimal (meio para longe do zero).
pub fn round1(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// Percentual (0–100) com uma casa; zero quando o total é zero.
pub fn rate(part: usize, total: usize) -> Decimal {
    if total == 0 {
        return Decimal::ZERO;
    }

    round1(Decimal::from(part as u64) * Decimal::ONE_HUNDRED / Decimal::from(total as u64))
}
