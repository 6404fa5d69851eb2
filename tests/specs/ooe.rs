mod three_node_pipeline;
