//! Driving a predictor over a trace.

use log::{ debug, info };

use crate::branch::*;
use crate::error::PredictorError;
use crate::predictor::BranchPredictor;
use crate::stats::TraceStats;

/// Run a predictor over some records in program order.
///
/// Every record is predicted and then immediately resolved with its
/// recorded outcome and target. Only conditional branches are scored.
pub fn run(predictor: &mut dyn BranchPredictor, records: &[BranchRecord])
    -> Result<TraceStats, PredictorError>
{
    let mut stat = TraceStats::new();
    for record in records {
        let prediction = predictor.predict(record)?;
        if record.is_conditional() {
            stat.update(record, prediction.outcome);
        }
        predictor.update(prediction, record.outcome(), record.tgt)?;
    }
    debug!("{}: {} records, {} conditional", predictor.name(),
        records.len(), stat.global_brns());
    Ok(stat)
}

/// Like [`run`], but the first `warmup` records only train the predictor
/// and are not counted.
pub fn run_with_warmup(predictor: &mut dyn BranchPredictor,
    records: &[BranchRecord], warmup: usize)
    -> Result<TraceStats, PredictorError>
{
    let warmup = warmup.min(records.len());
    let (head, tail) = records.split_at(warmup);
    run(predictor, head)?;
    let stat = run(predictor, tail)?;
    info!("{}: {}/{} correct ({:.2}%), {} misses after {} warmup records",
        predictor.name(), stat.global_hits(), stat.global_brns(),
        stat.hit_rate() * 100.0, stat.global_miss(), warmup);
    Ok(stat)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::predictor::*;
    use crate::trace::*;

    #[test]
    fn scores_only_conditional_branches() {
        let mut p = GshareConfig { table_bits: 4, history_length: 2 }
            .build().unwrap();
        let records = SyntheticTrace::new(0)
            .branch(0x5, 0x40, BranchPattern::AlwaysTaken)
            .jump(0x44, 0x0)
            .generate(14);
        let stat = run(&mut p, &records).unwrap();
        assert_eq!(stat.global_brns(), 7);
        assert_eq!(stat.num_unique_branches(), 1);
        // Same sequence as the gshare warm-up: four misses, then hits
        assert_eq!(stat.global_miss(), 4);
    }

    #[test]
    fn warmup_records_are_not_counted() {
        let mut p = PiecewiseConfig::cbp2().build().unwrap();
        let records = SyntheticTrace::new(0)
            .branch(0x100, 0x200, BranchPattern::AlwaysTaken)
            .branch(0x104, 0x200, BranchPattern::NeverTaken)
            .generate(400);
        let stat = run_with_warmup(&mut p, &records, 100).unwrap();
        assert_eq!(stat.global_brns(), 300);
        assert_eq!(stat.global_miss(), 0);
    }

    #[test]
    fn protocol_errors_propagate() {
        let mut p = PiecewiseConfig::cbp2().build().unwrap();
        let b = BranchRecord::conditional(0x10, 0x20, Outcome::T);
        p.predict(&b).unwrap();
        assert_eq!(run(&mut p, &[b]).unwrap_err(),
            PredictorError::PredictPending { pc: 0x10 });
    }
}
