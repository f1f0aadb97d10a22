#[cfg(test)]
mod tests {
    use crate::{SimBackend, SimFcInfo, SimNode, SimTriggerData, SimTupleTable};
    use plshim::pg_sys::{self, TriggerEvent};
    use plshim::trigger::{TriggerLevel, TriggerOp, TriggerWhen};
    use plshim::AdapterError;

    const BEFORE_INSERT_ROW: TriggerEvent =
        pg_sys::TRIGGER_EVENT_BEFORE | pg_sys::TRIGGER_EVENT_ROW | pg_sys::TRIGGER_EVENT_INSERT;

    #[test]
    fn test_plain_call_is_not_a_trigger() {
        let sim = SimBackend::new();
        let mut call = SimFcInfo::new([Some(pg_sys::Int32GetDatum(1))]);
        sim.enter(|| {
            let fcinfo = call.fcinfo();
            assert!(!fcinfo.called_as_trigger());
            assert_eq!(fcinfo.trigger().err(), Some(AdapterError::NotATrigger));
        })
    }

    #[test]
    fn test_other_context_nodes_are_not_triggers() {
        let sim = SimBackend::new();
        let mut agg = SimNode::new(SimBackend::TRIGGER_DATA_TAG - 1);
        let mut call = SimFcInfo::new([]).with_context(agg.as_node());
        sim.enter(|| {
            assert!(!call.fcinfo().called_as_trigger());
        })
    }

    #[test]
    fn test_row_trigger() -> eyre::Result<()> {
        let sim = SimBackend::new();
        let table = SimTupleTable::int4_column([Some(5)]);
        let mut data =
            SimTriggerData::new(BEFORE_INSERT_ROW, table.tuple(0), std::ptr::null_mut());
        let mut call = SimFcInfo::new([]).with_context(data.as_node());
        sim.enter(|| -> eyre::Result<()> {
            let fcinfo = call.fcinfo();
            assert!(fcinfo.called_as_trigger());
            let trigger = fcinfo.trigger()?;
            assert_eq!(trigger.event(), BEFORE_INSERT_ROW);
            assert_eq!(trigger.when(), TriggerWhen::Before);
            assert_eq!(trigger.level(), TriggerLevel::Row);
            assert_eq!(trigger.op(), TriggerOp::Insert);
            assert_eq!(trigger.trigtuple(), Some(table.tuple(0)));
            assert_eq!(trigger.newtuple(), None);
            Ok(())
        })
    }

    #[test]
    fn test_update_carries_both_rows() -> eyre::Result<()> {
        let sim = SimBackend::new();
        let table = SimTupleTable::int4_column([Some(1), Some(2)]);
        let event =
            pg_sys::TRIGGER_EVENT_AFTER | pg_sys::TRIGGER_EVENT_ROW | pg_sys::TRIGGER_EVENT_UPDATE;
        let mut data = SimTriggerData::new(event, table.tuple(0), table.tuple(1));
        let mut call = SimFcInfo::new([]).with_context(data.as_node());
        sim.enter(|| -> eyre::Result<()> {
            let trigger = call.fcinfo().trigger()?;
            assert_eq!(trigger.when(), TriggerWhen::After);
            assert_eq!(trigger.op(), TriggerOp::Update);
            assert_eq!(trigger.trigtuple(), Some(table.tuple(0)));
            assert_eq!(trigger.newtuple(), Some(table.tuple(1)));
            Ok(())
        })
    }

    #[test]
    fn test_statement_triggers() -> eyre::Result<()> {
        use pg_sys::{
            TRIGGER_EVENT_AFTER, TRIGGER_EVENT_BEFORE, TRIGGER_EVENT_DELETE, TRIGGER_EVENT_INSTEAD,
            TRIGGER_EVENT_TRUNCATE, TRIGGER_EVENT_UPDATE,
        };
        let sim = SimBackend::new();
        for (event, when, op) in [
            (TRIGGER_EVENT_AFTER | TRIGGER_EVENT_TRUNCATE, TriggerWhen::After, TriggerOp::Truncate),
            (TRIGGER_EVENT_BEFORE | TRIGGER_EVENT_DELETE, TriggerWhen::Before, TriggerOp::Delete),
            (TRIGGER_EVENT_INSTEAD | TRIGGER_EVENT_UPDATE, TriggerWhen::InsteadOf, TriggerOp::Update),
        ] {
            let mut data = SimTriggerData::new(event, std::ptr::null_mut(), std::ptr::null_mut());
            let mut call = SimFcInfo::new([]).with_context(data.as_node());
            sim.enter(|| -> eyre::Result<()> {
                let trigger = call.fcinfo().trigger()?;
                assert_eq!(trigger.level(), TriggerLevel::Statement, "{event:#x}");
                assert_eq!(trigger.when(), when, "{event:#x}");
                assert_eq!(trigger.op(), op, "{event:#x}");
                assert_eq!(trigger.trigtuple(), None);
                Ok(())
            })?;
        }
        Ok(())
    }

    #[test]
    fn test_display() {
        assert_eq!(TriggerWhen::InsteadOf.to_string(), "INSTEAD OF");
        assert_eq!(TriggerOp::Truncate.to_string(), "TRUNCATE");
    }

    #[test]
    fn test_tag_comes_from_the_backend() {
        let sim = SimBackend::new();
        sim.set_trigger_data_tag(Some(SimBackend::TRIGGER_DATA_TAG + 7));
        let mut data =
            SimTriggerData::new(BEFORE_INSERT_ROW, std::ptr::null_mut(), std::ptr::null_mut());
        let mut call = SimFcInfo::new([]).with_context(data.as_node());
        sim.enter(|| {
            assert!(!call.fcinfo().called_as_trigger());
        })
    }

    #[test]
    #[should_panic(expected = "TriggerData node tag is unknown")]
    fn test_unknown_tag_panics() {
        let sim = SimBackend::new();
        sim.set_trigger_data_tag(None);
        let mut data =
            SimTriggerData::new(BEFORE_INSERT_ROW, std::ptr::null_mut(), std::ptr::null_mut());
        let mut call = SimFcInfo::new([]).with_context(data.as_node());
        sim.enter(|| {
            call.fcinfo().called_as_trigger();
        })
    }

    #[test]
    fn test_unknown_tag_is_irrelevant_without_context() {
        let sim = SimBackend::new();
        sim.set_trigger_data_tag(None);
        let mut call = SimFcInfo::new([]);
        sim.enter(|| {
            assert!(!call.fcinfo().called_as_trigger());
        })
    }
}
