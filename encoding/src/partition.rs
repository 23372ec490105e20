//! Splitting batches into per-key groups
//!
//! Groups come out in order of first appearance of their key, so marshaling
//! the same batch twice yields the same message sequence.

use std::collections::HashMap;

use loadgen_core::model::{
    LogsData, MetricsData, Resource, ResourceSpans, ScopeSpans, TracesData,
};
use sha2::{Digest, Sha256};

/// Length of a resource-attribute partition key
pub const RESOURCE_KEY_LEN: usize = 16;

/// Stable key for a resource's attributes
///
/// Attributes are hashed in key order, so two resources with the same
/// attributes in a different order share a key. A missing resource hashes
/// like an empty one.
pub fn resource_key(resource: Option<&Resource>) -> Vec<u8> {
    let mut attributes: Vec<_> = resource
        .map(|r| r.attributes.iter().collect())
        .unwrap_or_default();
    attributes.sort_by(|a, b| a.key.cmp(&b.key));

    let mut hasher = Sha256::new();
    for attr in attributes {
        hasher.update((attr.key.len() as u64).to_le_bytes());
        hasher.update(attr.key.as_bytes());
        hasher.update((attr.value.len() as u64).to_le_bytes());
        hasher.update(attr.value.as_bytes());
    }
    hasher.finalize()[..RESOURCE_KEY_LEN].to_vec()
}

/// Bucket items by key, keeping first-appearance order of keys
fn group_by_key<T, F>(items: impl IntoIterator<Item = T>, key_of: F) -> Vec<(Vec<u8>, Vec<T>)>
where
    F: Fn(&T) -> Vec<u8>,
{
    let mut groups: Vec<(Vec<u8>, Vec<T>)> = Vec::new();
    let mut index: HashMap<Vec<u8>, usize> = HashMap::new();

    for item in items {
        let key = key_of(&item);
        match index.get(&key) {
            Some(&slot) => groups[slot].1.push(item),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, vec![item]));
            }
        }
    }
    groups
}

/// One batch per distinct trace id
///
/// Spans keep their resource and scope; an empty trace id is its own group.
pub fn split_traces_by_trace_id(traces: &TracesData) -> Vec<(Vec<u8>, TracesData)> {
    let mut groups: Vec<(Vec<u8>, TracesData)> = Vec::new();
    let mut index: HashMap<Vec<u8>, usize> = HashMap::new();

    for rs in &traces.resource_spans {
        for ss in &rs.scope_spans {
            let by_trace = group_by_key(ss.spans.iter(), |span| span.trace_id.clone());
            for (trace_id, spans) in by_trace {
                let slot = *index.entry(trace_id.clone()).or_insert_with(|| {
                    groups.push((trace_id, TracesData::default()));
                    groups.len() - 1
                });
                groups[slot].1.resource_spans.push(ResourceSpans {
                    resource: rs.resource.clone(),
                    scope_spans: vec![ScopeSpans {
                        scope: ss.scope.clone(),
                        spans: spans.into_iter().cloned().collect(),
                    }],
                });
            }
        }
    }
    groups
}

/// One batch per distinct resource-attribute key
pub fn group_metrics_by_resource(metrics: &MetricsData) -> Vec<(Vec<u8>, MetricsData)> {
    group_by_key(metrics.resource_metrics.iter(), |rm| {
        resource_key(rm.resource.as_ref())
    })
    .into_iter()
    .map(|(key, resource_metrics)| {
        let data = MetricsData {
            resource_metrics: resource_metrics.into_iter().cloned().collect(),
        };
        (key, data)
    })
    .collect()
}

/// One batch per distinct resource-attribute key
pub fn group_logs_by_resource(logs: &LogsData) -> Vec<(Vec<u8>, LogsData)> {
    group_by_key(logs.resource_logs.iter(), |rl| resource_key(rl.resource.as_ref()))
        .into_iter()
        .map(|(key, resource_logs)| {
            let data = LogsData {
                resource_logs: resource_logs.into_iter().cloned().collect(),
            };
            (key, data)
        })
        .collect()
}
