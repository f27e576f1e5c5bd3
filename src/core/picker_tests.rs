//! Column picker state machine tests
//!
//! Drive `ColumnPicker::dispatch` directly, playing the runtime's part by
//! completing the effects by hand.

#[cfg(test)]
mod tests {
    use crate::core::file_parser::{FileParser, FileParserConfig};
    use crate::core::file_source::{MemoryFileSource, SharedFileSource};
    use crate::core::models::*;
    use crate::core::picker::{ColumnPicker, PickerEffect, PickerEvent};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::sync::Arc;

    fn source(name: &str, content: &str) -> SharedFileSource {
        Arc::new(MemoryFileSource::new(name.to_string(), content.to_string()))
    }

    /// Offer a file and return the ticket of the read it asks for
    fn offer(picker: &mut ColumnPicker, source: SharedFileSource) -> LoadTicket {
        let effect = picker
            .dispatch(PickerEvent::FilesOffered {
                kind: IntakeKind::Drop,
                sources: vec![source],
            })
            .unwrap();
        match effect {
            Some(PickerEffect::ReadFile { ticket, .. }) => ticket,
            other => panic!("expected a read, got {:?}", other),
        }
    }

    fn complete(
        picker: &mut ColumnPicker,
        ticket: LoadTicket,
        content: &str,
    ) -> Option<PickerEffect> {
        picker
            .dispatch(PickerEvent::FileLoaded {
                ticket,
                data: Ok(content.as_bytes().to_vec()),
            })
            .unwrap()
    }

    fn load(picker: &mut ColumnPicker, content: &str) {
        let ticket = offer(picker, source("input.csv", content));
        complete(picker, ticket, content);
    }

    fn toggle(picker: &mut ColumnPicker, name: &str) {
        picker
            .dispatch(PickerEvent::ToggleColumn(name.to_string()))
            .unwrap();
    }

    /// Submit and return the columns and flag that would be sent
    fn submit(picker: &mut ColumnPicker) -> (SubmitTicket, Vec<String>, bool) {
        match picker.dispatch(PickerEvent::Submit).unwrap() {
            Some(PickerEffect::SendSubmission {
                ticket,
                columns,
                match_all,
                ..
            }) => (ticket, columns, match_all),
            other => panic!("expected a submission, got {:?}", other),
        }
    }

    #[test]
    fn test_starts_idle_with_submit_disabled() {
        let mut picker: ColumnPicker = ColumnPicker::default();
        assert_eq!(picker.phase(), PickerPhase::Idle);
        assert!(!picker.submit_enabled());
        assert!(matches!(
            picker.dispatch(PickerEvent::Submit),
            Err(AppError::InvalidState(_))
        ));
    }

    #[test]
    fn test_load_populates_available() {
        let mut picker: ColumnPicker = ColumnPicker::default();
        let ticket = offer(&mut picker, source("a.csv", "street;city;zip\n"));
        // still idle until the read completes
        assert_eq!(picker.phase(), PickerPhase::Idle);

        let effect = complete(&mut picker, ticket, "street;city;zip\n1;2;3\n");
        match effect {
            Some(PickerEffect::Notify(PickerNotification::Loaded {
                headers, delimiter, ..
            })) => {
                assert_eq!(headers, vec!["street", "city", "zip"]);
                assert_eq!(delimiter, ';');
            }
            other => panic!("expected Loaded, got {:?}", other),
        }

        let snapshot = picker.snapshot();
        assert_eq!(snapshot.phase, PickerPhase::Loaded);
        assert!(snapshot.submit_enabled);
        assert_eq!(snapshot.available, vec!["street", "city", "zip"]);
        assert!(snapshot.chosen.is_empty());
        assert_eq!(snapshot.file_name.as_deref(), Some("a.csv"));
        assert_eq!(snapshot.delimiter, Some(';'));
    }

    #[test]
    fn test_no_delimiter_keeps_submit_disabled() {
        let mut picker: ColumnPicker = ColumnPicker::default();
        let ticket = offer(&mut picker, source("single.csv", "singlecolumn\n"));
        let effect = complete(&mut picker, ticket, "singlecolumn\nvalue\n");

        assert!(matches!(
            effect,
            Some(PickerEffect::Notify(PickerNotification::LoadAborted { .. }))
        ));
        assert_eq!(picker.phase(), PickerPhase::Idle);
        assert!(picker.snapshot().available.is_empty());
        assert!(picker.dispatch(PickerEvent::Submit).is_err());
    }

    #[test]
    fn test_failed_read_aborts_load() {
        let mut picker: ColumnPicker = ColumnPicker::default();
        let ticket = offer(&mut picker, source("gone.csv", ""));
        let effect = picker
            .dispatch(PickerEvent::FileLoaded {
                ticket,
                data: Err(AppError::System("disk unplugged".into())),
            })
            .unwrap();

        match effect {
            Some(PickerEffect::Notify(PickerNotification::LoadAborted { reason, .. })) => {
                assert!(reason.contains("disk unplugged"))
            }
            other => panic!("expected LoadAborted, got {:?}", other),
        }
        assert_eq!(picker.phase(), PickerPhase::Idle);
    }

    #[test]
    fn test_last_selected_file_wins() {
        let mut picker: ColumnPicker = ColumnPicker::default();
        let first = offer(&mut picker, source("first.csv", ""));
        let second = offer(&mut picker, source("second.csv", ""));
        assert!(second > first);

        // the newer read finishes first, the older one straggles in afterwards
        assert!(complete(&mut picker, second, "x,y\n").is_some());
        assert!(complete(&mut picker, first, "a,b,c\n").is_none());

        let snapshot = picker.snapshot();
        assert_eq!(snapshot.available, vec!["x", "y"]);
        assert_eq!(snapshot.file_name.as_deref(), Some("second.csv"));
    }

    #[test]
    fn test_stale_read_before_newest_is_dropped() {
        let mut picker: ColumnPicker = ColumnPicker::default();
        let first = offer(&mut picker, source("first.csv", ""));
        let second = offer(&mut picker, source("second.csv", ""));

        assert!(complete(&mut picker, first, "a,b,c\n").is_none());
        assert_eq!(picker.phase(), PickerPhase::Idle);
        assert!(complete(&mut picker, second, "x|y\n").is_some());
        assert_eq!(picker.snapshot().available, vec!["x", "y"]);
    }

    #[test]
    fn test_only_first_offered_file_is_used() {
        let mut picker: ColumnPicker = ColumnPicker::default();
        let effect = picker
            .dispatch(PickerEvent::FilesOffered {
                kind: IntakeKind::Browse,
                sources: vec![source("one.csv", ""), source("two.csv", "")],
            })
            .unwrap();
        match effect {
            Some(PickerEffect::ReadFile { source, .. }) => assert_eq!(source.name(), "one.csv"),
            other => panic!("expected a read, got {:?}", other),
        }

        let none = picker
            .dispatch(PickerEvent::FilesOffered {
                kind: IntakeKind::Browse,
                sources: Vec::new(),
            })
            .unwrap();
        assert!(none.is_none());
    }

    #[test]
    fn test_reload_discards_partition() {
        let mut picker: ColumnPicker = ColumnPicker::default();
        load(&mut picker, "a,b,c\n");
        toggle(&mut picker, "b");
        toggle(&mut picker, "c");
        assert_eq!(picker.snapshot().chosen, vec!["b", "c"]);

        load(&mut picker, "p;q\n");
        let snapshot = picker.snapshot();
        assert_eq!(snapshot.available, vec!["p", "q"]);
        assert!(snapshot.chosen.is_empty());
    }

    #[test]
    fn test_submit_follows_choice_order() {
        let mut picker: ColumnPicker = ColumnPicker::default();
        load(&mut picker, "name,city,zip,country\n");
        toggle(&mut picker, "zip");
        toggle(&mut picker, "city");

        let (_, columns, match_all) = submit(&mut picker);
        assert_eq!(columns, vec!["zip", "city"]);
        assert!(!match_all);
    }

    #[test]
    fn test_drag_reorder_is_reflected_in_submission() {
        let mut picker: ColumnPicker = ColumnPicker::default();
        load(&mut picker, "name,city,zip,country\n");
        picker
            .dispatch(PickerEvent::DropOnChosen("zip".into()))
            .unwrap();
        picker
            .dispatch(PickerEvent::DropOnChosen("city".into()))
            .unwrap();
        picker
            .dispatch(PickerEvent::DropOnItem {
                dragged: "city".into(),
                target: "zip".into(),
            })
            .unwrap();
        picker
            .dispatch(PickerEvent::DropOnItem {
                dragged: "country".into(),
                target: "zip".into(),
            })
            .unwrap();
        picker.dispatch(PickerEvent::SetMatchAll(true)).unwrap();

        let (_, columns, match_all) = submit(&mut picker);
        assert_eq!(columns, vec!["city", "country", "zip"]);
        assert!(match_all);
    }

    #[test]
    fn test_submission_carries_size_limit() {
        let mut picker = ColumnPicker::new(FileParser::with_config(FileParserConfig {
            max_file_size: 2048,
            ..FileParserConfig::default()
        }));
        load(&mut picker, "city,zip\n");

        match picker.dispatch(PickerEvent::Submit).unwrap() {
            Some(PickerEffect::SendSubmission { max_file_size, .. }) => {
                assert_eq!(max_file_size, 2048)
            }
            other => panic!("expected a submission, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_column_is_rejected() {
        let mut picker: ColumnPicker = ColumnPicker::default();
        load(&mut picker, "a,b\n");
        assert!(matches!(
            picker.dispatch(PickerEvent::ToggleColumn("z".into())),
            Err(AppError::UnknownColumn(_))
        ));
        assert_eq!(picker.snapshot().available, vec!["a", "b"]);
    }

    #[test]
    fn test_submission_lifecycle_success() {
        let mut picker: ColumnPicker = ColumnPicker::default();
        load(&mut picker, "city,zip\n");
        toggle(&mut picker, "city");
        let (ticket, _, _) = submit(&mut picker);

        assert_eq!(picker.phase(), PickerPhase::Submitting);
        assert!(!picker.submit_enabled());
        assert!(matches!(
            picker.dispatch(PickerEvent::Submit),
            Err(AppError::InvalidState(_))
        ));
        // columns still move while the request is in flight
        toggle(&mut picker, "zip");

        let effect = picker
            .dispatch(PickerEvent::SubmitFinished {
                ticket,
                result: Ok(SubmitResponse {
                    status: 200,
                    body: "lat,lon\n1,2".into(),
                }),
            })
            .unwrap();
        match effect {
            Some(PickerEffect::Present { document, .. }) => {
                assert_eq!(document.content, "lat,lon\n1,2");
                assert_eq!(document.mime_type, DOCUMENT_MIME);
            }
            other => panic!("expected Present, got {:?}", other),
        }
        assert_eq!(picker.phase(), PickerPhase::Loaded);
        assert!(picker.submit_enabled());
    }

    #[test]
    fn test_non_200_is_reported_and_reenables_submit() {
        let mut picker: ColumnPicker = ColumnPicker::default();
        load(&mut picker, "city,zip\n");
        let (ticket, _, _) = submit(&mut picker);

        let effect = picker
            .dispatch(PickerEvent::SubmitFinished {
                ticket,
                result: Ok(SubmitResponse {
                    status: 502,
                    body: "bad gateway".into(),
                }),
            })
            .unwrap();
        match effect {
            Some(PickerEffect::Notify(PickerNotification::SubmitFailed { message, .. })) => {
                assert!(message.contains("502"))
            }
            other => panic!("expected SubmitFailed, got {:?}", other),
        }
        assert!(picker.submit_enabled());
    }

    #[test]
    fn test_transport_error_is_reported() {
        let mut picker: ColumnPicker = ColumnPicker::default();
        load(&mut picker, "city,zip\n");
        let (ticket, _, _) = submit(&mut picker);

        let effect = picker
            .dispatch(PickerEvent::SubmitFinished {
                ticket,
                result: Err(AppError::Submit("connection refused".into())),
            })
            .unwrap();
        assert!(matches!(
            effect,
            Some(PickerEffect::Notify(PickerNotification::SubmitFailed { .. }))
        ));
        assert_eq!(picker.phase(), PickerPhase::Loaded);
    }

    #[test]
    fn test_unknown_submission_completion_is_ignored() {
        let mut picker: ColumnPicker = ColumnPicker::default();
        load(&mut picker, "city,zip\n");
        let effect = picker
            .dispatch(PickerEvent::SubmitFinished {
                ticket: SubmitTicket(42),
                result: Ok(SubmitResponse {
                    status: 200,
                    body: String::new(),
                }),
            })
            .unwrap();
        assert!(effect.is_none());
        assert_eq!(picker.phase(), PickerPhase::Loaded);
    }

    #[test]
    fn test_hover_flags_follow_drag() {
        let mut picker: ColumnPicker = ColumnPicker::default();
        picker.dispatch(PickerEvent::HolderHover(true)).unwrap();
        assert!(picker.snapshot().holder_hover);
        load(&mut picker, "a,b\n");
        assert!(!picker.snapshot().holder_hover);

        picker.dispatch(PickerEvent::ChosenHover(true)).unwrap();
        assert!(picker.snapshot().chosen_hover);
        picker
            .dispatch(PickerEvent::DropOnChosen("a".into()))
            .unwrap();
        assert!(!picker.snapshot().chosen_hover);
    }

    #[test]
    fn test_random_moves_preserve_partition() {
        let headers: Vec<String> = (0..12).map(|i| format!("col{}", i)).collect();
        let content = format!("{}\n", headers.join(","));
        let mut rng = StdRng::seed_from_u64(0x5eed);

        for _ in 0..50 {
            let mut picker: ColumnPicker = ColumnPicker::default();
            load(&mut picker, &content);

            for _ in 0..200 {
                let name = headers[rng.gen_range(0..headers.len())].clone();
                let event = match rng.gen_range(0..3) {
                    0 => PickerEvent::ToggleColumn(name),
                    1 => PickerEvent::DropOnChosen(name),
                    _ => PickerEvent::DropOnItem {
                        dragged: name,
                        target: headers[rng.gen_range(0..headers.len())].clone(),
                    },
                };
                picker.dispatch(event).unwrap();

                let snapshot = picker.snapshot();
                let mut seen: Vec<String> = snapshot
                    .available
                    .iter()
                    .chain(snapshot.chosen.iter())
                    .cloned()
                    .collect();
                seen.sort();
                let mut expected = headers.clone();
                expected.sort();
                assert_eq!(seen, expected);
            }
        }
    }
}
