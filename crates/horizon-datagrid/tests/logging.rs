//! Subsystem log targets filter the way the README describes.

use std::io;
use std::sync::Arc;

use horizon_datagrid::binding::{RowBinding, ScalarStore, TemplateBuilder};
use horizon_datagrid::data::{ColumnId, DataSet, DataSource, Value, ValueKind};
use horizon_datagrid::grid::{GridDefinition, GridLength, GridRange};
use horizon_datagrid::layout::Viewport;
use horizon_datagrid::presenter::{GridPresenter, GridTemplate};
use horizon_datagrid::validation::AsyncValidatorGroup;
use horizon_datagrid::view::{ElementKind, ElementSpec};
use horizon_datagrid::GridConfig;
use horizon_datagrid_core::ThreadPoolConfig;
use parking_lot::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn template() -> GridTemplate {
    let definition = GridDefinition::builder()
        .column(GridLength::Fixed(80.0))
        .row(GridLength::Fixed(20.0))
        .build()
        .unwrap();
    let text = ElementSpec::simple(ElementKind("text"), "text");
    GridTemplate::new(definition).with_rows(
        TemplateBuilder::new()
            .add_child(RowBinding::column(text, GridRange::cell(0, 0), "text", ColumnId(0)), "name")
            .build(),
    )
}

#[test]
fn test_filter_selects_subsystems() {
    let capture = Capture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(
            "horizon_datagrid::presenter=debug,horizon_datagrid::data=trace",
        ))
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let data = DataSet::builder().column("name", ValueKind::Text).build();
        let data = Arc::new(data);
        let config = GridConfig::default().with_thread_pool(ThreadPoolConfig::with_threads(1));
        let mut grid = GridPresenter::new(
            data.clone(),
            template(),
            ScalarStore::new(),
            AsyncValidatorGroup::new(),
            config,
        )
        .unwrap();
        data.push_row(vec![Value::from("Ada")]).unwrap();
        grid.layout(Viewport::new(80.0, 40.0));
        assert_eq!(data.row_count(), 1);
    });

    let logged = capture.text();
    assert!(logged.contains("horizon_datagrid::presenter"), "{logged}");
    assert!(logged.contains("created grid presenter"), "{logged}");
    assert!(logged.contains("row inserted"), "{logged}");
    assert!(!logged.contains("horizon_datagrid::layout"), "{logged}");
    assert!(!logged.contains("horizon_datagrid::elements"), "{logged}");
}
