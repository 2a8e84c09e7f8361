use crate::analysis::{ApplicationTopology, Connection, Endpoint, PlatformTopology, Topology};
use crate::config::VizConfig;
use crate::model::{Layer, PubSubEntry};
use crate::render::naming::{escape_html, node_name, thread_label};

/// Render a resolved topology as a GraphViz digraph.
pub fn render_dot(topology: &Topology, config: &VizConfig) -> String {
    let mut writer = DotWriter::new(config);
    writer.topology(topology);
    writer.finish()
}

/// Incremental DOT emitter: one cluster per platform, a nested cluster per
/// application, one box node per (most-derived) thread.
pub struct DotWriter<'a> {
    config: &'a VizConfig,
    out: String,
    cluster: usize,
}

impl<'a> DotWriter<'a> {
    pub fn new(config: &'a VizConfig) -> Self {
        Self { config, out: String::new(), cluster: 0 }
    }

    pub fn finish(self) -> String {
        self.out
    }

    pub fn topology(&mut self, topology: &Topology) {
        self.line(0, &format!("digraph {} {{", quote(&topology.deployment)));
        self.line(1, &format!("splines={}", self.config.splines));

        for platform in &topology.platforms {
            self.platform(platform);
        }

        for sub in &topology.disconnected_vehicle_subscribers {
            self.disconnected_subscription(1, sub, Layer::InterVehicle);
        }

        self.line(0, "}");
    }

    fn platform(&mut self, platform: &PlatformTopology) {
        let cluster = self.next_cluster();
        self.line(1, &format!("subgraph cluster_{cluster} {{"));
        self.line(1, &format!("label={}", quote(&platform.name)));
        self.line(1, &format!("fontcolor={}", quote(&self.config.colors.vehicle)));

        for application in &platform.applications {
            self.application(&platform.name, application);
        }
        for sub in &platform.disconnected_process_subscribers {
            self.disconnected_subscription(2, sub, Layer::InterProcess);
        }

        self.line(1, "}");

        for application in &platform.applications {
            for connection in &application.intervehicle.connections {
                self.connection(1, connection);
            }
            for publication in &application.intervehicle.disconnected_publishers {
                self.disconnected_publication(1, publication, Layer::InterVehicle);
            }
        }
    }

    fn application(&mut self, platform: &str, application: &ApplicationTopology) {
        let cluster = self.next_cluster();
        self.line(2, &format!("subgraph cluster_{cluster} {{"));
        self.line(2, &format!("label={}", quote(&application.name)));
        self.line(2, &format!("fontcolor={}", quote(&self.config.colors.process)));

        for thread in &application.threads {
            self.line(
                3,
                &format!(
                    "{} [label=<{}>,fontcolor={},shape=box]",
                    quote(&node_name(platform, &application.name, &thread.display_name)),
                    thread_label(&thread.display_name),
                    quote(&self.config.colors.thread)
                ),
            );
            for connection in &thread.interthread.connections {
                self.connection(3, connection);
            }
            for publication in &thread.interthread.disconnected_publishers {
                self.disconnected_publication(3, publication, Layer::InterThread);
            }
        }
        for sub in &application.disconnected_thread_subscribers {
            self.disconnected_subscription(3, sub, Layer::InterThread);
        }

        self.line(2, "}");

        for connection in &application.interprocess.connections {
            self.connection(2, connection);
        }
        for publication in &application.interprocess.disconnected_publishers {
            self.disconnected_publication(2, publication, Layer::InterProcess);
        }
    }

    fn connection(&mut self, depth: usize, connection: &Connection) {
        let from = endpoint_node(&connection.publisher);
        let to = endpoint_node(&connection.subscriber);
        self.edge(depth, &from, &to, &connection.publisher.entry, connection.layer);
    }

    fn disconnected_publication(&mut self, depth: usize, publication: &Endpoint, layer: Layer) {
        if self.config.omit_disconnected || publication.entry.is_inner_pub {
            return;
        }
        let node = endpoint_node(publication);
        let placeholder = quote(&format!("{}_no_subscribers_{layer}", endpoint_id(publication)));
        self.line(depth, &format!("{placeholder} [label=\"\",style=invis]"));
        self.edge(depth, &node, &placeholder, &publication.entry, layer);
    }

    fn disconnected_subscription(&mut self, depth: usize, subscription: &Endpoint, layer: Layer) {
        if self.config.omit_disconnected {
            return;
        }
        let node = endpoint_node(subscription);
        let placeholder = quote(&format!("{}_no_publishers_{layer}", endpoint_id(subscription)));
        self.line(depth, &format!("{placeholder} [label=\"\",style=invis]"));
        self.edge(depth, &placeholder, &node, &subscription.entry, layer);
    }

    fn edge(&mut self, depth: usize, from: &str, to: &str, entry: &PubSubEntry, layer: Layer) {
        let label = format!(
            "<b><font point-size=\"10\">{}</font></b>\
             <br/><font point-size=\"6\">{}</font>\
             <br/><font point-size=\"8\">{}</font>",
            escape_html(&entry.group),
            escape_html(&entry.scheme),
            escape_html(&entry.type_name)
        );
        let color = quote(self.layer_color(layer));
        self.line(depth, &format!("{from}->{to} [label=<{label}>,color={color}]"));
    }

    fn layer_color(&self, layer: Layer) -> &str {
        match layer {
            Layer::InterThread | Layer::Unknown => &self.config.colors.thread,
            Layer::InterProcess => &self.config.colors.process,
            Layer::InterVehicle => &self.config.colors.vehicle,
        }
    }

    fn next_cluster(&mut self) -> usize {
        let cluster = self.cluster;
        self.cluster += 1;
        cluster
    }

    fn line(&mut self, depth: usize, text: &str) {
        for _ in 0..depth {
            self.out.push('\t');
        }
        self.out.push_str(text);
        self.out.push('\n');
    }
}

fn endpoint_id(endpoint: &Endpoint) -> String {
    node_name(&endpoint.platform, &endpoint.application, &endpoint.entry.thread)
}

/// Quoted node id, so sanitized names stay valid DOT ids whatever else they contain.
fn endpoint_node(endpoint: &Endpoint) -> String {
    quote(&endpoint_id(endpoint))
}

/// Quote a DOT string attribute.
fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}
