mod abort_requires_undo;
